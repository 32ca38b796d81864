//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use loopia_client::{DnsRecord, Loopia, LoopiaError, RecordType, RpcTransport, Value};

pub const USER: &str = "user@loopiaapi";
pub const PASSWORD: &str = "password";

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub params: Vec<Value>,
}

impl RecordedCall {
    /// Params after the two credential params.
    pub fn args(&self) -> &[Value] {
        &self.params[2..]
    }
}

#[derive(Default)]
struct MockState {
    responses: HashMap<String, Result<Value, LoopiaError>>,
    calls: Vec<RecordedCall>,
}

/// Scripted transport that records every call.
///
/// Clones share state, so a test keeps one handle and gives the other to
/// the client.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `method` with `response`.
    pub fn respond(&self, method: &str, response: Value) -> &Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert(method.to_string(), Ok(response));
        self
    }

    /// Fails `method` at the transport level.
    pub fn fail(&self, method: &str, error: LoopiaError) -> &Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert(method.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    /// The single recorded call, asserting there was exactly one.
    pub fn only_call(&self) -> RecordedCall {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one call, got {calls:?}");
        calls[0].clone()
    }
}

impl RpcTransport for MockTransport {
    fn call(&self, method: &str, params: &[Value]) -> loopia_client::Result<Value> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RecordedCall {
            method: method.to_string(),
            params: params.to_vec(),
        });
        match state.responses.get(method) {
            Some(response) => response.clone(),
            None => Err(LoopiaError::Fault {
                code: 623,
                message: format!("no response scripted for {method}"),
            }),
        }
    }
}

/// A client wired to a fresh mock transport.
pub fn mock_client() -> (Loopia, MockTransport) {
    let transport = MockTransport::new();
    let loopia = Loopia::builder(USER, PASSWORD)
        .transport(transport.clone())
        .build()
        .unwrap();
    (loopia, transport)
}

pub fn record() -> DnsRecord {
    DnsRecord::builder(RecordType::A)
        .ttl(3600)
        .priority(0)
        .data("127.0.0.1")
        .id(1)
        .build()
        .unwrap()
}

pub fn record_value() -> Value {
    wire_struct(&[
        ("type", Value::from("A")),
        ("ttl", Value::from(3600)),
        ("priority", Value::from(0)),
        ("rdata", Value::from("127.0.0.1")),
        ("record_id", Value::from(1)),
    ])
}

pub fn domain_value(domain: &str, expiration: &str, status: &str, paid: i32, reference: i32) -> Value {
    wire_struct(&[
        ("domain", Value::from(domain)),
        ("expiration_date", Value::from(expiration)),
        ("renewal_status", Value::from(status)),
        ("registered", Value::from(1)),
        ("paid", Value::from(paid)),
        ("reference_no", Value::from(reference)),
    ])
}

pub fn wire_struct(members: &[(&str, Value)]) -> Value {
    Value::Struct(
        members
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect::<BTreeMap<_, _>>(),
    )
}

pub fn status(code: &str) -> Value {
    Value::Array(vec![Value::from(code)])
}
