use std::{path::Path, sync::Arc};

use stddict::{
    DictionaryService,
    EntryKind,
    EntrySource,
    EntryStore,
    Error,
    Query,
    defaults,
};

const TERMS: &str = r#"[
    {"type": "TERM", "koName": "고객번호", "enAbbr": "CUST_NO", "enName": "Customer Number"},
    {"type": "TERM", "koName": "고객명", "enAbbr": "CUST_NM", "description": "고객의 이름"}
]"#;

const WORDS: &str = r#"[
    {"type": "WORD", "koName": "고객", "enAbbr": "CUST", "enName": "Customer", "synonyms": ["손님"]},
    {"type": "WORD", "koName": "번호", "enAbbr": "NO"}
]"#;

const DOMAINS: &str = r#"[
    {"type": "DOMAIN", "koName": "번호", "domainGroup": "번호", "domainCategory": "일련번호", "domainName": "번호V10"}
]"#;

fn setup_defaults(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join("terms.json"), TERMS)?;
    std::fs::write(dir.join("words.json"), WORDS)?;
    std::fs::write(dir.join("domains.json"), DOMAINS)?;
    Ok(())
}

fn open_service(
    root: &Path,
) -> Result<DictionaryService, Box<dyn std::error::Error>> {
    let defaults = defaults::load_default_entries(&root.join("defaults"))?;
    let store = EntryStore::open(&root.join("dictionary.redb"))?;
    Ok(DictionaryService::open(store, defaults)?)
}

#[test]
fn defaults_are_searchable() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    setup_defaults(&tmp.path().join("defaults"))?;
    let service = open_service(tmp.path())?;

    assert_eq!(service.index().len(), 5);

    let hits = service.search(&Query::new("cust"), 10);
    assert_eq!(hits[0].entry.korean_name, "고객");
    assert!(hits.iter().all(|h| h.entry.source == EntrySource::Default));

    let hits = service.search(&Query::new("손님"), 10);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].entry.english_abbreviation.as_deref(), Some("CUST"));

    let hits = service.search(&Query::new("번호").with_kind(EntryKind::Domain), 10);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].entry.domain_name.as_deref(), Some("번호V10"));
    Ok(())
}

#[test]
fn import_survives_reopen() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    setup_defaults(&tmp.path().join("defaults"))?;

    {
        let service = open_service(tmp.path())?;
        let summary = service.import_json(
            r#"[
                {"type": "WORD", "koName": "고객", "enAbbr": "cust", "description": "서비스를 받는 사람"},
                {"type": "WORD", "koName": "계좌", "enAbbr": "ACCT"}
            ]"#,
        )?;
        assert_eq!((summary.added, summary.merged, summary.skipped), (1, 1, 0));
    }

    let service = open_service(tmp.path())?;
    assert_eq!(service.index().len(), 6);

    let hits = service.search(&Query::new("고객"), 10);
    let customer = &hits[0].entry;
    assert_eq!(customer.korean_name, "고객");
    assert_eq!(customer.source, EntrySource::Imported);
    assert_eq!(customer.description.as_deref(), Some("서비스를 받는 사람"));
    assert!(customer.synonyms.contains("손님"));
    assert!(customer.imported_at.is_some());

    let last = service.status()?.last_import.ok_or("no summary")?;
    assert_eq!(last.added, 1);
    Ok(())
}

#[test]
fn reimport_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    setup_defaults(&tmp.path().join("defaults"))?;
    let service = open_service(tmp.path())?;

    service.import_json(WORDS)?;
    let first = service.effective_entries()?;
    let again = service.import_json(WORDS)?;

    assert_eq!(again.skipped, 2);
    assert_eq!(again.added + again.merged, 0);
    assert_eq!(service.effective_entries()?, first);
    Ok(())
}

#[test]
fn reset_returns_to_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    setup_defaults(&tmp.path().join("defaults"))?;
    let service = open_service(tmp.path())?;
    let pristine = service.effective_entries()?;

    service.import_json(r#"[{"type": "WORD", "koName": "계좌", "enAbbr": "ACCT"}]"#)?;
    service.set_override_only(true)?;
    assert_eq!(service.index().len(), 1);
    service.set_override_only(false)?;

    service.reset()?;

    assert_eq!(service.effective_entries()?, pristine);
    assert_eq!(service.index().entries(), pristine.as_slice());
    assert_eq!(service.store().user_entry_count()?, 0);
    Ok(())
}

#[test]
fn malformed_batch_fails_whole() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    setup_defaults(&tmp.path().join("defaults"))?;
    let service = open_service(tmp.path())?;

    let err = service
        .import_json(
            r#"[
                {"type": "WORD", "koName": "계좌", "enAbbr": "ACCT"},
                {"type": "WORD", "koName": "  "}
            ]"#,
        )
        .unwrap_err();

    assert!(matches!(err, Error::InvalidEntry { position: 1, .. }));
    assert_eq!(service.store().user_entry_count()?, 0);
    assert!(service.search(&Query::new("ACCT"), 10).is_empty());
    Ok(())
}

#[tokio::test]
async fn searches_run_during_background_import()
-> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    setup_defaults(&tmp.path().join("defaults"))?;
    let service = Arc::new(open_service(tmp.path())?);

    let batch: Vec<String> = (0..500)
        .map(|i| {
            format!(r#"{{"type": "WORD", "koName": "항목{i}", "enAbbr": "ITEM{i}"}}"#)
        })
        .collect();
    let import = tokio::spawn(
        Arc::clone(&service)
            .import_json_in_background(format!("[{}]", batch.join(","))),
    );

    // Every snapshot is either the old index or the new one.
    while !import.is_finished() {
        let len = service.index().len();
        assert!(len == 5 || len == 505, "saw partial index of {len}");
        tokio::task::yield_now().await;
    }

    let summary = import.await??;
    assert_eq!(summary.added, 500);
    assert_eq!(service.index().len(), 505);
    assert_eq!(service.search(&Query::new("ITEM499"), 1)[0].entry.korean_name, "항목499");
    Ok(())
}
