//! Loopia 真实 API 测试
//!
//! 运行方式:
//! ```bash
//! LOOPIA_USERNAME=xxx LOOPIA_PASSWORD=xxx LOOPIA_TEST_DOMAIN=example.com \
//!     cargo test -p loopia-client --test live_test -- --ignored --nocapture
//! ```

mod common;

use loopia_client::{DnsRecord, Loopia, RecordType};

fn client() -> Loopia {
    Loopia::from_env().expect("credentials from environment")
}

#[test]
#[ignore = "需要真实 API 凭证"]
fn test_loopia_validate_credentials() {
    skip_if_no_credentials!("LOOPIA_USERNAME", "LOOPIA_PASSWORD");

    let valid = require_ok!(client().validate_credentials());
    assert!(valid, "凭证应该有效");
}

#[test]
#[ignore = "需要真实 API 凭证"]
fn test_loopia_get_domains() {
    skip_if_no_credentials!("LOOPIA_USERNAME", "LOOPIA_PASSWORD");

    let domains = require_ok!(client().get_domains());
    for domain in &domains {
        println!(
            "{} expires {} (auto renew: {:?})",
            domain.domain, domain.expiration_date, domain.auto_renew
        );
    }
}

#[test]
#[ignore = "需要真实 API 凭证"]
fn test_loopia_record_lifecycle() {
    skip_if_no_credentials!("LOOPIA_USERNAME", "LOOPIA_PASSWORD", "LOOPIA_TEST_DOMAIN");

    let loopia = client();
    let domain = std::env::var("LOOPIA_TEST_DOMAIN").unwrap();
    let subdomain = "_loopia-client-test";
    let data = "loopia-client lifecycle";

    // 1. 创建
    let record = require_ok!(
        DnsRecord::builder(RecordType::Txt)
            .ttl(300)
            .data(data)
            .build()
    );
    require_ok!(loopia.add_zone_record(&record, &domain, Some(subdomain)));

    // 2. 查询，拿到服务端分配的 id
    let records = require_ok!(loopia.get_zone_records(&domain, Some(subdomain)));
    let created = records
        .into_iter()
        .find(|r| r.record_type() == RecordType::Txt && r.data() == data)
        .expect("新建的记录应该可见");
    assert_ne!(created.id(), 0);

    // 3. 更新
    let updated = require_ok!(created.replace().ttl(600).build());
    require_ok!(loopia.update_zone_record(&updated, &domain, Some(subdomain)));

    // 4. 清理
    require_ok!(loopia.remove_zone_record(updated.id(), &domain, Some(subdomain)));
    require_ok!(loopia.remove_subdomain(&domain, Some(subdomain)));
}
