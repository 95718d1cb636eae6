//! End-to-end harvests against a stub repository.

mod common;

use std::io::Write;

use common::{fixture, list_records_page, StubFetch, HOST};
use oai_harvest::{
    ConfigurationError, DataCiteDocument, FormatCatalog, HarvestParameters, OaiPmhHarvester,
    ParameterKey,
};

fn record_xml(name: &str) -> String {
    fixture(name).trim().to_string()
}

fn dc_repository() -> StubFetch {
    let live = record_xml("dublin_core_record.xml");
    let deleted = record_xml("dublin_core_deleted.xml");
    StubFetch::repository()
        .with(
            format!("{HOST}?verb=ListRecords&from=2017-01-01&metadataPrefix=oai_dc"),
            list_records_page(&[live.clone(), deleted], Some("page-2")),
        )
        .with(
            format!("{HOST}?verb=ListRecords&resumptionToken=page-2"),
            list_records_page(&[live], None),
        )
}

fn parameters() -> HarvestParameters {
    HarvestParameters::new()
        .with_host_url(HOST)
        .with_metadata_prefix("oai_dc")
        .with_from("2017-01-01")
}

#[test]
fn test_harvest_dublin_core_pages() {
    let harvester =
        OaiPmhHarvester::with_parameters(FormatCatalog::new(), dc_repository(), &parameters())
            .expect("configured");

    let mut documents: Vec<DataCiteDocument> = Vec::new();
    let summary = harvester
        .harvest(|doc| {
            documents.push(doc);
            Ok(())
        })
        .expect("harvest");

    assert_eq!(summary.records, 3);
    assert_eq!(summary.documents, 3);
    assert_eq!(summary.skipped, 0);
    let deleted: Vec<bool> = documents.iter().map(DataCiteDocument::is_deleted).collect();
    assert_eq!(deleted, vec![false, true, false]);
}

#[test]
fn test_iso_harvest_skips_deleted_records() {
    let iso = record_xml("iso19139_record.xml");
    let deleted = record_xml("dublin_core_deleted.xml");
    let fetch = StubFetch::repository().with(
        format!("{HOST}?verb=ListRecords&metadataPrefix=iso19139"),
        list_records_page(&[deleted, iso], None),
    );
    let parameters = HarvestParameters::new()
        .with_host_url(HOST)
        .with_metadata_prefix("iso19139");
    let harvester = OaiPmhHarvester::with_parameters(FormatCatalog::new(), fetch, &parameters)
        .expect("configured");

    let mut identifiers = Vec::new();
    let summary = harvester
        .harvest(|doc| {
            identifiers.push(doc.identifier);
            Ok(())
        })
        .expect("harvest");

    assert_eq!(summary.records, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(identifiers, vec![Some("10.1594/EXAMPLE.123".to_string())]);
}

#[test]
fn test_no_records_match_is_an_empty_harvest() {
    let fetch = StubFetch::repository().with(
        format!("{HOST}?verb=ListRecords&metadataPrefix=oai_dc"),
        r#"<OAI-PMH><error code="noRecordsMatch">No records</error></OAI-PMH>"#,
    );
    let parameters = HarvestParameters::new()
        .with_host_url(HOST)
        .with_metadata_prefix("oai_dc");
    let harvester = OaiPmhHarvester::with_parameters(FormatCatalog::new(), fetch, &parameters)
        .expect("configured");

    let summary = harvester.harvest(|_| Ok(())).expect("harvest");
    assert_eq!(summary.records, 0);
}

#[test]
fn test_parameters_from_toml_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        "hostUrl = \"{HOST}\"\nmetadataPrefix = \"oai_dc\"\nfrom = \"2017-01-01\"\nlogoUrl = \"https://repo.example.org/logo.png\""
    )
    .expect("write");

    let parameters = HarvestParameters::from_toml_file(file.path()).expect("parameters");
    let harvester = OaiPmhHarvester::with_parameters(FormatCatalog::new(), dc_repository(), &parameters)
        .expect("configured");

    assert_eq!(harvester.logo_url(), Some("https://repo.example.org/logo.png"));
    assert_eq!(
        harvester.list_records_url().expect("url"),
        format!("{HOST}?verb=ListRecords&from=2017-01-01&metadataPrefix=oai_dc")
    );
    assert_eq!(harvester.repository_name(), "Example Earth Data Repository");
}

#[test]
fn test_unreachable_host_rejects_prefix() {
    let parameters = HarvestParameters::new()
        .with_host_url("https://down.example.org/oai")
        .with_metadata_prefix("oai_dc");
    let err = OaiPmhHarvester::with_parameters(FormatCatalog::new(), StubFetch::unreachable(), &parameters)
        .unwrap_err();
    assert_eq!(err, ConfigurationError::NoRepositoryFormats);
}

#[test]
fn test_host_change_renegotiates() {
    let mut harvester = OaiPmhHarvester::new(FormatCatalog::new(), dc_repository());
    harvester
        .set_parameter(ParameterKey::HostUrl, HOST)
        .expect("host");
    harvester
        .set_parameter(ParameterKey::MetadataPrefix, "iso19139")
        .expect("prefix");
    assert!(harvester.dispatcher().current_transformer().is_ok());

    harvester
        .set_parameter(ParameterKey::HostUrl, "https://other.example.org/oai")
        .expect("valid url");
    assert!(harvester.dispatcher().current_transformer().is_err());
    assert!(harvester.dispatcher().usable_formats().is_empty());
    assert_eq!(harvester.repository_name(), "Other.example.org");
}
