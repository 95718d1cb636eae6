//! Record transformation against fixture records.

mod common;

use common::{record_fixture, StubFetch, HOST};
use oai_harvest::document::{
    ContributorType, Date, DateType, DescriptionType, GeoLocation, RelatedIdentifierType,
    ResourceTypeGeneral, WebLinkType,
};
use oai_harvest::{
    DeletedRecordPolicy, DublinCoreTransformer, FormatCatalog, Iso19139Transformer,
    ListRecordsReader, MetadataStandard, RecordTransformer, XmlElement,
};

#[test]
fn test_iso19139_full_record() {
    let record = record_fixture("iso19139_record.xml");
    let doc = Iso19139Transformer::default()
        .transform(&record)
        .expect("non-deleted records always yield a document");

    assert_eq!(doc.identifier.as_deref(), Some("10.1594/EXAMPLE.123"));
    assert_eq!(doc.repository_identifier.as_deref(), Some("OAI-PMH"));
    assert_eq!(doc.publisher.as_deref(), Some("Example Earth Data Repository"));
    assert_eq!(doc.creators.len(), 1);
    assert_eq!(doc.creators[0].name, "Example Earth Data Repository");
    assert_eq!(doc.titles[0].value, "Sea surface temperature during cruise PS101");

    let resource_type = doc.resource_type.as_ref().expect("resource type");
    assert_eq!(resource_type.value, "dataset");
    assert_eq!(resource_type.general_type, ResourceTypeGeneral::Dataset);

    // The publication date overrides the datestamp year
    assert_eq!(doc.publication_year, Some(2016));
    assert_eq!(
        doc.dates,
        vec![
            Date::new("2016-10-01T00:00:00", DateType::Created),
            Date::new("2016-12-24T12:00:00", DateType::Issued),
        ]
    );

    assert_eq!(doc.descriptions.len(), 1);
    assert_eq!(doc.descriptions[0].description_type, DescriptionType::Abstract);

    assert_eq!(doc.research_data.len(), 1);
    assert_eq!(
        doc.research_data[0].url,
        "https://repo.example.org/dataset/123?format=textfile"
    );
    assert_eq!(doc.research_data[0].title, doc.titles[0].value);
}

#[test]
fn test_iso19139_geolocations_skip_bad_blocks() {
    let record = record_fixture("iso19139_record.xml");
    let doc = Iso19139Transformer::default()
        .transform(&record)
        .expect("document");

    assert_eq!(
        doc.geo_locations,
        vec![
            GeoLocation::Point {
                longitude: -12.5,
                latitude: 54.25,
            },
            GeoLocation::Box {
                west: -20.0,
                east: 5.5,
                south: 48.0,
                north: 62.75,
            },
        ]
    );
}

#[test]
fn test_iso19139_datestamp_year_without_publication_date() {
    let xml = r#"<record><header><identifier>x</identifier></header><metadata>
        <gmd:MD_Metadata>
          <gmd:dateStamp><gco:Date>2011-04-05</gco:Date></gmd:dateStamp>
          <gmd:identificationInfo><gmd:citation><gmd:CI_Citation>
            <gmd:date><gmd:CI_Date>
              <gmd:date><gco:Date>not yet</gco:Date></gmd:date>
              <gmd:dateType><gmd:CI_DateTypeCode codeListValue="publication"/></gmd:dateType>
            </gmd:CI_Date></gmd:date>
          </gmd:CI_Citation></gmd:citation></gmd:identificationInfo>
        </gmd:MD_Metadata></metadata></record>"#;
    let doc = Iso19139Transformer::default()
        .transform(&XmlElement::parse(xml).expect("xml"))
        .expect("document");

    assert_eq!(doc.publication_year, Some(2011));
    assert_eq!(doc.dates, vec![Date::new("not yet", DateType::Issued)]);
    assert!(doc.identifier.is_none());
}

#[test]
fn test_iso19139_issued_date_overrides_datestamp_year() {
    let xml = r#"<record><metadata><gmd:MD_Metadata>
        <gmd:dateStamp><gco:DateTime>2015-06-30T08:00:00</gco:DateTime></gmd:dateStamp>
        <gmd:identificationInfo><gmd:citation><gmd:CI_Citation>
          <gmd:date><gmd:CI_Date>
            <gmd:date><gco:Date>2012-03-01</gco:Date></gmd:date>
            <gmd:dateType><gmd:CI_DateTypeCode codeListValue="publication"/></gmd:dateType>
          </gmd:CI_Date></gmd:date>
        </gmd:CI_Citation></gmd:citation></gmd:identificationInfo>
        </gmd:MD_Metadata></metadata></record>"#;
    let doc = Iso19139Transformer::default()
        .transform(&XmlElement::parse(xml).expect("xml"))
        .expect("document");
    assert_eq!(doc.publication_year, Some(2012));
}

#[test]
fn test_iso19139_datestamp_year_without_issued_date() {
    let xml = r#"<record><metadata><gmd:MD_Metadata>
        <gmd:dateStamp><gco:DateTime>2015-06-30T08:00:00</gco:DateTime></gmd:dateStamp>
        <gmd:identificationInfo><gmd:citation><gmd:CI_Citation>
          <gmd:date><gmd:CI_Date>
            <gmd:date><gco:Date>2014-01-10</gco:Date></gmd:date>
            <gmd:dateType><gmd:CI_DateTypeCode codeListValue="creation"/></gmd:dateType>
          </gmd:CI_Date></gmd:date>
        </gmd:CI_Citation></gmd:citation></gmd:identificationInfo>
        </gmd:MD_Metadata></metadata></record>"#;
    let doc = Iso19139Transformer::default()
        .transform(&XmlElement::parse(xml).expect("xml"))
        .expect("document");

    assert_eq!(doc.publication_year, Some(2015));
    assert_eq!(doc.dates, vec![Date::new("2014-01-10", DateType::Created)]);
}

#[test]
fn test_iso19139_research_data_needs_a_title() {
    let xml = r#"<record><metadata><gmd:MD_Metadata>
        <gmd:distributionInfo><gmd:onLine><gmd:linkage>
          <gmd:URL>https://repo.example.org/dataset/9</gmd:URL>
        </gmd:linkage></gmd:onLine></gmd:distributionInfo>
        </gmd:MD_Metadata></metadata></record>"#;
    let doc = Iso19139Transformer::default()
        .transform(&XmlElement::parse(xml).expect("xml"))
        .expect("document");
    assert!(doc.titles.is_empty());
    assert!(doc.research_data.is_empty());
}

#[test]
fn test_iso19139_invalid_research_data_url() {
    let xml = r#"<record><metadata><gmd:MD_Metadata>
        <gmd:identificationInfo><gmd:citation><gmd:title>
          <gco:CharacterString>Title</gco:CharacterString>
        </gmd:title></gmd:citation></gmd:identificationInfo>
        <gmd:distributionInfo><gmd:onLine><gmd:linkage>
          <gmd:URL>www.example.org/data</gmd:URL>
        </gmd:linkage></gmd:onLine></gmd:distributionInfo>
        </gmd:MD_Metadata></metadata></record>"#;
    let doc = Iso19139Transformer::default()
        .transform(&XmlElement::parse(xml).expect("xml"))
        .expect("document");
    assert!(doc.research_data.is_empty());
    assert_eq!(doc.titles.len(), 1);
}

#[test]
fn test_dublin_core_full_record() {
    let record = record_fixture("dublin_core_record.xml");
    let doc = DublinCoreTransformer::new()
        .transform(&record)
        .expect("document");

    assert_eq!(doc.identifier.as_deref(), Some("oai:figshare.com:article/5573584"));
    assert_eq!(doc.publication_year, Some(2017));
    assert_eq!(
        doc.dates,
        vec![
            Date::new("2017-11-02T15:04:11Z", DateType::Updated),
            Date::new("2017-10-30T09:00:00Z", DateType::Available),
        ]
    );
    assert_eq!(doc.formats, vec!["Dataset"]);
    assert_eq!(
        doc.creators.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        vec!["Jane Doe", "Max Mustermann"]
    );
    assert_eq!(doc.contributors[0].name, "Data Team");
    assert_eq!(doc.contributors[0].contributor_type, ContributorType::ContactPerson);
    assert_eq!(doc.subjects.len(), 2);
    assert_eq!(doc.publisher.as_deref(), Some("figshare"));
    assert_eq!(doc.language.as_deref(), Some("en"));

    let links: Vec<(&str, &str)> = doc
        .web_links
        .iter()
        .map(|l| (l.name.as_str(), l.url.as_str()))
        .collect();
    assert_eq!(
        links,
        vec![
            ("Identifier2", "https://doi.org/10.6084/m9.figshare.5573584"),
            ("Identifier1", "https://figshare.com/articles/5573584"),
        ]
    );
    assert!(doc.web_links.iter().all(|l| l.link_type == WebLinkType::ViewURL));
    assert!(doc.related_identifiers.is_empty());
}

#[test]
fn test_dublin_core_doi_reference() {
    let xml = r#"<record><header><identifier>a</identifier></header>
        <metadata><oai_dc:dc><DOI>10.1000/182</DOI></oai_dc:dc></metadata></record>"#;
    let doc = DublinCoreTransformer::new()
        .transform(&XmlElement::parse(xml).expect("xml"))
        .expect("document");
    assert_eq!(doc.related_identifiers.len(), 1);
    assert_eq!(doc.related_identifiers[0].value, "10.1000/182");
    assert_eq!(
        doc.related_identifiers[0].identifier_type,
        RelatedIdentifierType::DOI
    );
}

#[test]
fn test_deleted_record_asymmetry() {
    let record = record_fixture("dublin_core_deleted.xml");

    let tombstone = DublinCoreTransformer::new()
        .transform(&record)
        .expect("Dublin Core keeps tombstones");
    assert!(tombstone.is_deleted());
    assert_eq!(tombstone.identifier.as_deref(), Some("oai:figshare.com:article/5000001"));
    assert_eq!(
        tombstone.dates,
        vec![Date::new("2017-12-01T00:00:00Z", DateType::Updated)]
    );
    assert!(tombstone.titles.is_empty());

    assert!(Iso19139Transformer::default().transform(&record).is_none());
}

#[test]
fn test_prefixed_envelope_from_list_records() {
    let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<oai:OAI-PMH xmlns:oai="http://www.openarchives.org/OAI/2.0/">
  <oai:ListRecords>
    <oai:record>
      <oai:header status="deleted">
        <oai:identifier>oai:example.org:gone</oai:identifier>
        <oai:datestamp>2018-03-04</oai:datestamp>
      </oai:header>
    </oai:record>
    <oai:record>
      <oai:header>
        <oai:identifier>oai:example.org:live</oai:identifier>
        <oai:datestamp>2018-03-05</oai:datestamp>
      </oai:header>
      <oai:metadata>
        <oai_dc:dc><dc:title>Still here</dc:title></oai_dc:dc>
      </oai:metadata>
    </oai:record>
  </oai:ListRecords>
</oai:OAI-PMH>"#;
    let fetch = StubFetch::unreachable().with(
        format!("{HOST}?verb=ListRecords&metadataPrefix=oai_dc"),
        body,
    );
    let records: Vec<XmlElement> = ListRecordsReader::new(fetch, HOST, "oai_dc", None, None)
        .expect("reader")
        .collect::<oai_harvest::Result<_>>()
        .expect("records");
    assert_eq!(records.len(), 2);

    assert!(Iso19139Transformer::default().transform(&records[0]).is_none());
    let tombstone = DublinCoreTransformer::new()
        .transform(&records[0])
        .expect("Dublin Core keeps tombstones");
    assert!(tombstone.is_deleted());
    assert_eq!(tombstone.identifier.as_deref(), Some("oai:example.org:gone"));
    assert_eq!(
        tombstone.dates,
        vec![Date::new("2018-03-04", DateType::Updated)]
    );

    let live = DublinCoreTransformer::new()
        .transform(&records[1])
        .expect("document");
    assert!(!live.is_deleted());
    assert_eq!(live.identifier.as_deref(), Some("oai:example.org:live"));
    assert_eq!(live.titles[0].value, "Still here");
}

#[test]
fn test_catalog_policies() {
    let catalog = FormatCatalog::with_repository_identifier("PANGAEA");
    let dc = catalog
        .create(MetadataStandard::DublinCore.schema())
        .expect("built in");
    let iso = catalog
        .create(MetadataStandard::Iso19139.schema())
        .expect("built in");

    assert_eq!(dc.deleted_record_policy(), DeletedRecordPolicy::Tombstone);
    assert_eq!(iso.deleted_record_policy(), DeletedRecordPolicy::Skip);

    let doc = iso
        .transform(&record_fixture("iso19139_record.xml"))
        .expect("document");
    assert_eq!(doc.repository_identifier.as_deref(), Some("PANGAEA"));
}

#[test]
fn test_document_json_shape() {
    let doc = DublinCoreTransformer::new()
        .transform(&record_fixture("dublin_core_deleted.xml"))
        .expect("tombstone");
    let json: serde_json::Value = serde_json::to_value(&doc).expect("serialize");
    assert_eq!(json["identifier"], "oai:figshare.com:article/5000001");
    assert_eq!(json["deleted"], true);
    assert_eq!(json["dates"][0]["type"], "Updated");
    assert!(json.get("titles").is_none());
}
