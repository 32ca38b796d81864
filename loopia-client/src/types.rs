use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{LoopiaError, Result};
use crate::rpc::Value;

/// Default TTL applied when a record is built without one.
pub const DEFAULT_TTL: u32 = 3600;

/// Largest value an XML-RPC `int` can carry.
const MAX_INT: i64 = 2_147_483_647;

/// Validates a strictly-typed, non-negative integer field.
///
/// Booleans, strings and doubles are type errors; negative or oversized
/// integers are value errors.
fn validate_int(field: &str, value: &Value) -> Result<u32> {
    let Some(i) = value.as_i64() else {
        return Err(LoopiaError::invalid_type(field, "int", value));
    };
    if i < 0 {
        return Err(LoopiaError::invalid_value(field, "must not be less than 0"));
    }
    if i > MAX_INT {
        return Err(LoopiaError::invalid_value(
            field,
            format!("must not be greater than {MAX_INT}"),
        ));
    }
    u32::try_from(i).map_err(|_| LoopiaError::invalid_value(field, "out of range"))
}

fn require<'a>(members: &'a BTreeMap<String, Value>, key: &str, what: &str) -> Result<&'a Value> {
    members
        .get(key)
        .ok_or_else(|| LoopiaError::parse(format!("{what} is missing field '{key}'")))
}

fn require_struct<'a>(value: &'a Value, what: &str) -> Result<&'a BTreeMap<String, Value>> {
    value
        .as_struct()
        .ok_or_else(|| LoopiaError::invalid_type(what, "struct", value))
}

fn require_str<'a>(field: &str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| LoopiaError::invalid_type(field, "string", value))
}

// ============ Record Types ============

/// The zone record types the provider accepts.
///
/// Serialized as uppercase strings (`"A"`, `"AAAA"`, `"IPSECKEY"`, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Cert,
    Cname,
    Hinfo,
    Hip,
    Ipseckey,
    Loc,
    Mx,
    Naptr,
    Ns,
    Srv,
    Sshfp,
    Txt,
}

impl RecordType {
    pub const ALL: [Self; 14] = [
        Self::A,
        Self::Aaaa,
        Self::Cert,
        Self::Cname,
        Self::Hinfo,
        Self::Hip,
        Self::Ipseckey,
        Self::Loc,
        Self::Mx,
        Self::Naptr,
        Self::Ns,
        Self::Srv,
        Self::Sshfp,
        Self::Txt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cert => "CERT",
            Self::Cname => "CNAME",
            Self::Hinfo => "HINFO",
            Self::Hip => "HIP",
            Self::Ipseckey => "IPSECKEY",
            Self::Loc => "LOC",
            Self::Mx => "MX",
            Self::Naptr => "NAPTR",
            Self::Ns => "NS",
            Self::Srv => "SRV",
            Self::Sshfp => "SSHFP",
            Self::Txt => "TXT",
        }
    }

    fn from_value(value: &Value) -> Result<Self> {
        require_str("type", value)?.parse()
    }
}

/// Matching is exact: `"a"` is not a record type.
impl FromStr for RecordType {
    type Err = LoopiaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|t| t.as_str()).collect();
                LoopiaError::invalid_value(
                    "type",
                    format!("'{s}' is not either of ({})", known.join(", ")),
                )
            })
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RecordType> for Value {
    fn from(t: RecordType) -> Self {
        Value::String(t.as_str().to_string())
    }
}

// ============ DNS Record ============

/// One zone resource record.
///
/// Immutable: every change goes through [`replace`](Self::replace), which
/// re-runs the same validation as construction. An `id` of `0` means the
/// provider has not assigned one yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DnsRecord {
    #[serde(rename = "type")]
    record_type: RecordType,
    ttl: u32,
    priority: u32,
    data: String,
    id: u32,
}

impl DnsRecord {
    /// A record of `record_type` with every other field at its default.
    pub fn new(record_type: RecordType) -> Self {
        Self {
            record_type,
            ttl: DEFAULT_TTL,
            priority: 0,
            data: String::new(),
            id: 0,
        }
    }

    /// Starts a validated build. `record_type` may be a [`RecordType`] or a
    /// string that is checked on [`build`](DnsRecordBuilder::build).
    pub fn builder(record_type: impl Into<Value>) -> DnsRecordBuilder {
        DnsRecordBuilder {
            record_type: record_type.into(),
            ttl: None,
            priority: None,
            data: None,
            id: None,
        }
    }

    /// A builder seeded with this record's fields; the record itself is
    /// left untouched.
    pub fn replace(&self) -> DnsRecordBuilder {
        DnsRecordBuilder {
            record_type: self.record_type.into(),
            ttl: Some(self.ttl.into()),
            priority: Some(self.priority.into()),
            data: Some(self.data.clone()),
            id: Some(self.id.into()),
        }
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Reconstructs a record from the provider's wire struct
    /// (`type, ttl, priority, rdata, record_id`).
    pub fn from_value(value: &Value) -> Result<Self> {
        let members = require_struct(value, "record")?;
        let data = require_str("rdata", require(members, "rdata", "zone record")?)?;

        Self::builder(require(members, "type", "zone record")?.clone())
            .ttl(require(members, "ttl", "zone record")?.clone())
            .priority(require(members, "priority", "zone record")?.clone())
            .data(data)
            .id(require(members, "record_id", "zone record")?.clone())
            .build()
    }

    /// The provider's wire struct for this record.
    pub fn to_value(&self) -> Value {
        let mut members = BTreeMap::new();
        members.insert("type".to_string(), self.record_type.into());
        members.insert("ttl".to_string(), self.ttl.into());
        members.insert("priority".to_string(), self.priority.into());
        members.insert("rdata".to_string(), Value::from(self.data.as_str()));
        members.insert("record_id".to_string(), self.id.into());
        Value::Struct(members)
    }
}

impl std::fmt::Display for DnsRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DnsRecord(type='{}', ttl={}, priority={}, data='{}', id={})",
            self.record_type, self.ttl, self.priority, self.data, self.id
        )
    }
}

/// Validating builder for [`DnsRecord`].
///
/// Numeric setters accept any [`Value`] so that dynamically typed input is
/// rejected with [`LoopiaError::InvalidType`] instead of being coerced.
/// Omitted fields take their defaults; explicit zeroes are kept.
#[derive(Debug, Clone)]
#[must_use]
pub struct DnsRecordBuilder {
    record_type: Value,
    ttl: Option<Value>,
    priority: Option<Value>,
    data: Option<String>,
    id: Option<Value>,
}

impl DnsRecordBuilder {
    pub fn record_type(mut self, record_type: impl Into<Value>) -> Self {
        self.record_type = record_type.into();
        self
    }

    pub fn ttl(mut self, ttl: impl Into<Value>) -> Self {
        self.ttl = Some(ttl.into());
        self
    }

    pub fn priority(mut self, priority: impl Into<Value>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn build(self) -> Result<DnsRecord> {
        let record_type = RecordType::from_value(&self.record_type)?;
        let ttl = match &self.ttl {
            Some(v) => validate_int("ttl", v)?,
            None => DEFAULT_TTL,
        };
        let priority = match &self.priority {
            Some(v) => validate_int("priority", v)?,
            None => 0,
        };
        let id = match &self.id {
            Some(v) => validate_int("id", v)?,
            None => 0,
        };

        Ok(DnsRecord {
            record_type,
            ttl,
            priority,
            data: self.data.unwrap_or_default(),
            id,
        })
    }
}

// ============ Record Id ============

/// A validated zone record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RecordId(u32);

impl RecordId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<&Value> for RecordId {
    type Error = LoopiaError;

    fn try_from(value: &Value) -> Result<Self> {
        validate_int("id", value).map(Self)
    }
}

impl TryFrom<Value> for RecordId {
    type Error = LoopiaError;

    fn try_from(value: Value) -> Result<Self> {
        Self::try_from(&value)
    }
}

impl TryFrom<u32> for RecordId {
    type Error = LoopiaError;

    fn try_from(id: u32) -> Result<Self> {
        Self::try_from(Value::from(id))
    }
}

impl TryFrom<i32> for RecordId {
    type Error = LoopiaError;

    fn try_from(id: i32) -> Result<Self> {
        Self::try_from(Value::from(id))
    }
}

impl TryFrom<i64> for RecordId {
    type Error = LoopiaError;

    fn try_from(id: i64) -> Result<Self> {
        Self::try_from(Value::from(id))
    }
}

/// Identifiers that arrive as text are a caller bug, not something to parse.
impl TryFrom<&str> for RecordId {
    type Error = LoopiaError;

    fn try_from(id: &str) -> Result<Self> {
        Self::try_from(Value::from(id))
    }
}

impl From<RecordId> for Value {
    fn from(id: RecordId) -> Self {
        Value::from(id.0)
    }
}

// ============ Domain ============

/// Renewal status as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RenewalStatus {
    /// `NORMAL`: renews automatically.
    Normal,
    /// `DEACTIVATED`: will not renew.
    Deactivated,
    /// `NOT_HANDLED_BY_LOOPIA`: renewal is managed elsewhere.
    NotHandledByLoopia,
    /// Anything else, kept verbatim.
    Other(String),
}

impl RenewalStatus {
    pub fn from_wire(status: &str) -> Self {
        match status {
            "NORMAL" => Self::Normal,
            "DEACTIVATED" => Self::Deactivated,
            "NOT_HANDLED_BY_LOOPIA" => Self::NotHandledByLoopia,
            other => Self::Other(other.to_string()),
        }
    }

    /// `Some` only for the two statuses with a definite meaning.
    pub fn auto_renew(&self) -> Option<bool> {
        match self {
            Self::Normal => Some(true),
            Self::Deactivated => Some(false),
            Self::NotHandledByLoopia | Self::Other(_) => None,
        }
    }
}

/// A domain belonging to the account. Read-only; never sent back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Domain {
    pub domain: String,
    pub expiration_date: NaiveDate,
    pub renewal_status: RenewalStatus,
    /// Derived from `renewal_status`; `None` when the status is not one this
    /// client can interpret.
    pub auto_renew: Option<bool>,
    pub registered: bool,
    pub paid: bool,
    pub invoice_number: u32,
}

impl Domain {
    /// Projects the provider's wire struct (`domain, expiration_date,
    /// renewal_status, registered, paid, reference_no`).
    pub fn from_value(value: &Value) -> Result<Self> {
        let members = require_struct(value, "domain")?;

        let domain = require_str("domain", require(members, "domain", "domain")?)?;
        if domain.is_empty() {
            return Err(LoopiaError::invalid_value("domain", "must not be empty"));
        }

        let expiration_date = parse_date(require_str(
            "expiration_date",
            require(members, "expiration_date", "domain")?,
        )?)?;

        let renewal_status = RenewalStatus::from_wire(require_str(
            "renewal_status",
            require(members, "renewal_status", "domain")?,
        )?);

        Ok(Self {
            domain: domain.to_string(),
            expiration_date,
            auto_renew: renewal_status.auto_renew(),
            renewal_status,
            registered: parse_flag("registered", require(members, "registered", "domain")?)?,
            paid: parse_flag("paid", require(members, "paid", "domain")?)?,
            invoice_number: validate_int(
                "reference_no",
                require(members, "reference_no", "domain")?,
            )?,
        })
    }
}

/// Strict `YYYY-MM-DD`.
fn parse_date(s: &str) -> Result<NaiveDate> {
    let well_formed = s.len() == 10
        && s.char_indices()
            .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
    if !well_formed {
        return Err(LoopiaError::invalid_value(
            "expiration_date",
            format!("'{s}' is not a YYYY-MM-DD date"),
        ));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| LoopiaError::invalid_value("expiration_date", format!("'{s}': {e}")))
}

/// Flags arrive as `0`/`1` ints; real booleans are accepted too.
fn parse_flag(field: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Int(i) => Ok(*i != 0),
        other => Err(LoopiaError::invalid_type(field, "int", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> DnsRecord {
        DnsRecord::builder(RecordType::A)
            .ttl(3600)
            .priority(0)
            .data("127.0.0.1")
            .id(1)
            .build()
            .unwrap()
    }

    fn record_value() -> Value {
        let mut members = BTreeMap::new();
        members.insert("type".to_string(), Value::from("A"));
        members.insert("ttl".to_string(), Value::from(3600));
        members.insert("priority".to_string(), Value::from(0));
        members.insert("rdata".to_string(), Value::from("127.0.0.1"));
        members.insert("record_id".to_string(), Value::from(1));
        Value::Struct(members)
    }

    fn domain_value(status: &str) -> Value {
        let mut members = BTreeMap::new();
        members.insert("domain".to_string(), Value::from("foo.bar"));
        members.insert("expiration_date".to_string(), Value::from("2000-01-01"));
        members.insert("renewal_status".to_string(), Value::from(status));
        members.insert("registered".to_string(), Value::from(1));
        members.insert("paid".to_string(), Value::from(0));
        members.insert("reference_no".to_string(), Value::from(42));
        Value::Struct(members)
    }

    fn with_member(value: &Value, key: &str, member: Value) -> Value {
        let mut members = value.as_struct().unwrap().clone();
        members.insert(key.to_string(), member);
        Value::Struct(members)
    }

    // ---- DnsRecord construction ----

    #[test]
    fn record_fields() {
        let r = record();
        assert_eq!(r.record_type(), RecordType::A);
        assert_eq!(r.ttl(), 3600);
        assert_eq!(r.priority(), 0);
        assert_eq!(r.data(), "127.0.0.1");
        assert_eq!(r.id(), 1);
    }

    #[test]
    fn record_defaults_apply_to_omitted_fields_only() {
        let r = DnsRecord::builder("MX").build().unwrap();
        assert_eq!(r, DnsRecord::new(RecordType::Mx));
        assert_eq!(r.ttl(), DEFAULT_TTL);
        assert_eq!(r.data(), "");

        let zero_ttl = DnsRecord::builder("MX").ttl(0).build().unwrap();
        assert_eq!(zero_ttl.ttl(), 0);
    }

    #[test]
    fn record_equality() {
        let r1 = record();
        let r2 = record();
        let r3 = record().replace().id(2).build().unwrap();
        assert_eq!(r1, r2);
        assert_ne!(r1, r3);
        assert_ne!(r2, r3);
    }

    #[test]
    fn replace_leaves_original_untouched() {
        let r = record();
        let txt = r.replace().record_type("TXT").build().unwrap();
        assert_eq!(txt.record_type(), RecordType::Txt);
        assert_eq!(txt.data(), "127.0.0.1");
        assert_eq!(r.record_type(), RecordType::A);
    }

    #[test]
    fn all_record_types_accepted() {
        for t in RecordType::ALL {
            let replaced = record().replace().record_type(t.as_str()).build().unwrap();
            assert_eq!(replaced.record_type(), t);
            assert_eq!(DnsRecord::new(t).record_type(), t);
        }
    }

    #[test]
    fn invalid_record_types_rejected() {
        for t in ["a", "ANAME", "TEXT", ""] {
            let err = record().replace().record_type(t).build().unwrap_err();
            assert!(matches!(err, LoopiaError::InvalidValue { .. }), "{t}: {err:?}");
        }
        let err = record().replace().record_type(1).build().unwrap_err();
        assert!(matches!(err, LoopiaError::InvalidType { .. }), "{err:?}");
    }

    #[test]
    fn invalid_integer_fields() {
        type Setter = fn(DnsRecordBuilder, Value) -> DnsRecordBuilder;
        let setters: [(&str, Setter); 3] = [
            ("ttl", |b, v| b.ttl(v)),
            ("priority", |b, v| b.priority(v)),
            ("id", |b, v| b.id(v)),
        ];

        for (field, set) in setters {
            let err = set(record().replace(), Value::from("900")).build().unwrap_err();
            assert!(
                matches!(&err, LoopiaError::InvalidType { field: f, .. } if f == field),
                "{field} string: {err:?}"
            );

            let err = set(record().replace(), Value::Bool(true)).build().unwrap_err();
            assert!(
                matches!(&err, LoopiaError::InvalidType { found: "boolean", .. }),
                "{field} bool: {err:?}"
            );

            let err = set(record().replace(), Value::Double(1.0)).build().unwrap_err();
            assert!(matches!(err, LoopiaError::InvalidType { .. }), "{field} double");

            let err = set(record().replace(), Value::from(-1)).build().unwrap_err();
            assert!(
                matches!(&err, LoopiaError::InvalidValue { field: f, .. } if f == field),
                "{field} negative: {err:?}"
            );

            let err = set(record().replace(), Value::Int(MAX_INT + 1))
                .build()
                .unwrap_err();
            assert!(matches!(err, LoopiaError::InvalidValue { .. }), "{field} overflow");
        }
    }

    #[test]
    fn record_display() {
        assert_eq!(
            record().to_string(),
            "DnsRecord(type='A', ttl=3600, priority=0, data='127.0.0.1', id=1)"
        );
    }

    // ---- DnsRecord wire mapping ----

    #[test]
    fn record_from_value() {
        assert_eq!(DnsRecord::from_value(&record_value()).unwrap(), record());
    }

    #[test]
    fn record_to_value() {
        assert_eq!(record().to_value(), record_value());
    }

    #[test]
    fn record_round_trips_for_every_type() {
        for t in RecordType::ALL {
            let r = DnsRecord::builder(t)
                .ttl(300)
                .priority(10)
                .data("payload")
                .id(MAX_INT)
                .build()
                .unwrap();
            assert_eq!(DnsRecord::from_value(&r.to_value()).unwrap(), r);
        }
    }

    #[test]
    fn record_from_value_missing_field() {
        let mut members = record_value().as_struct().unwrap().clone();
        members.remove("record_id");
        let err = DnsRecord::from_value(&Value::Struct(members)).unwrap_err();
        assert!(matches!(err, LoopiaError::Parse { .. }), "{err:?}");
    }

    #[test]
    fn record_from_value_wrong_types() {
        let err = DnsRecord::from_value(&with_member(&record_value(), "ttl", Value::from("3600")))
            .unwrap_err();
        assert!(matches!(err, LoopiaError::InvalidType { .. }), "{err:?}");

        let err = DnsRecord::from_value(&Value::from("OK")).unwrap_err();
        assert!(matches!(err, LoopiaError::InvalidType { .. }), "{err:?}");
    }

    // ---- RecordId ----

    #[test]
    fn record_id_validation() {
        assert_eq!(RecordId::try_from(7_u32).unwrap().get(), 7);
        assert_eq!(RecordId::try_from(0_i64).unwrap().get(), 0);
        assert!(matches!(
            RecordId::try_from(-1_i32),
            Err(LoopiaError::InvalidValue { .. })
        ));
        assert!(matches!(
            RecordId::try_from("id"),
            Err(LoopiaError::InvalidType { .. })
        ));
        assert!(matches!(
            RecordId::try_from(Value::Bool(false)),
            Err(LoopiaError::InvalidType { .. })
        ));
    }

    // ---- Domain ----

    #[test]
    fn domain_from_value() {
        let d = Domain::from_value(&domain_value("NORMAL")).unwrap();
        assert_eq!(d.domain, "foo.bar");
        assert_eq!(d.expiration_date, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        assert_eq!(d.renewal_status, RenewalStatus::Normal);
        assert_eq!(d.auto_renew, Some(true));
        assert!(d.registered);
        assert!(!d.paid);
        assert_eq!(d.invoice_number, 42);
    }

    #[test]
    fn domain_renewal_statuses() {
        let cases = [
            ("NORMAL", Some(true)),
            ("DEACTIVATED", Some(false)),
            ("NOT_HANDLED_BY_LOOPIA", None),
            ("SOMETHING_NEW", None),
        ];
        for (status, expected) in cases {
            let d = Domain::from_value(&domain_value(status)).unwrap();
            assert_eq!(d.auto_renew, expected, "{status}");
        }
        assert_eq!(
            Domain::from_value(&domain_value("SOMETHING_NEW"))
                .unwrap()
                .renewal_status,
            RenewalStatus::Other("SOMETHING_NEW".to_string())
        );
    }

    #[test]
    fn domain_flags_accept_booleans() {
        let value = with_member(&domain_value("NORMAL"), "paid", Value::Bool(true));
        assert!(Domain::from_value(&value).unwrap().paid);
    }

    #[test]
    fn domain_rejects_bad_dates() {
        for date in ["2000-1-1", "2000-02-30", "01/01/2000", "2000-01-01T00:00:00", ""] {
            let value = with_member(&domain_value("NORMAL"), "expiration_date", Value::from(date));
            let err = Domain::from_value(&value).unwrap_err();
            assert!(matches!(err, LoopiaError::InvalidValue { .. }), "{date}: {err:?}");
        }
    }

    #[test]
    fn domain_rejects_empty_name() {
        let value = with_member(&domain_value("NORMAL"), "domain", Value::from(""));
        assert!(matches!(
            Domain::from_value(&value),
            Err(LoopiaError::InvalidValue { .. })
        ));
    }

    #[test]
    fn domain_serializes_status() {
        let d = Domain::from_value(&domain_value("NOT_HANDLED_BY_LOOPIA")).unwrap();
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"renewal_status\":\"NOT_HANDLED_BY_LOOPIA\""));
        assert!(json.contains("\"auto_renew\":null"));
        assert!(json.contains("\"expiration_date\":\"2000-01-01\""));
    }
}
