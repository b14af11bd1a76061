// tests/policy_filter.rs
//
// Source policy: rule semantics on article domains and policy files on disk.

use std::io::Write as _;

use news_pulse::policy::{load_policy_from, PolicyVerdict, SourcePolicy};
use news_pulse::text::normalize_domain;

#[test]
fn deny_list_rejects_subdomains() {
    let p = SourcePolicy::new(&[] as &[&str], &["spam.com"]);
    assert!(!p.admits("news.spam.com"));
    assert!(p.admits("reuters.com"));
}

#[test]
fn allow_list_only_admits_listed_domains() {
    let p = SourcePolicy::new(&["reuters.com"], &[]);
    assert_eq!(p.evaluate("bbc.com"), PolicyVerdict::NotAllowed);
    assert_eq!(p.evaluate("reuters.com"), PolicyVerdict::Admit);
}

#[test]
fn empty_policy_admits_everything() {
    let p = SourcePolicy::default();
    assert!(p.is_empty());
    let (kept, rejected) = p.filter(vec!["a.com", "b.com"], |d| *d);
    assert_eq!(kept.len(), 2);
    assert_eq!(rejected, 0);
}

#[test]
fn article_urls_are_matched_on_their_host() {
    let p = SourcePolicy::new(&[] as &[&str], &["spam.com"]);
    for url in [
        "https://news.spam.com/story?id=1",
        "http://WWW.SPAM.COM:8080/",
        "https://user@spam.com./x",
    ] {
        assert!(!p.admits(&normalize_domain(url)), "{url} should be denied");
    }
}

#[test]
fn loads_json_and_toml_policy_files() {
    let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(json, r#"{{"allowDomains":["https://www.Reuters.com"],"denyDomains":["spam.com","spam.com"]}}"#).unwrap();
    let p = load_policy_from(json.path()).expect("json policy");
    assert_eq!(p.allow_domains, vec!["reuters.com"]);
    assert_eq!(p.deny_domains, vec!["spam.com"]);

    let mut toml = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(toml, r#"denyDomains = ["www.tabloid.example", "TABLOID.example."]"#).unwrap();
    let p = load_policy_from(toml.path()).expect("toml policy");
    assert!(p.allow_domains.is_empty());
    assert_eq!(p.deny_domains, vec!["tabloid.example"]);
}

#[test]
fn missing_policy_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_policy_from(&dir.path().join("nope.json")).unwrap_err();
    assert!(format!("{err:#}").contains("reading source policy"));
}
