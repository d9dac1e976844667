//! Builds Notion "create page" payloads from normalized company records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// Every exported page starts in this research state.
const RESEARCH_DEFAULT: &str = "Not started";
const RESEARCH_COLOR: &str = "orange";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("notion database id must not be empty")]
    EmptyDatabaseId,
}

/// A company row as the dashboard submits it for export.
///
/// All string fields are accepted as-is; empty optional fields are dropped
/// from the resulting page rather than sent as empty placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyExport {
    pub name: String,
    pub website: String,
    pub crunchbase_url: String,
    pub icon_url: String,
    pub description: String,
    pub funding: String,
    pub country: String,
    pub founded: String,
    pub lastfunding: String,
    pub stocksymbol: String,
    pub acquired: String,
    pub founders: Vec<String>,
    pub tags: Vec<String>,
}

/// Body for `POST /v1/pages`, shaped exactly as the Notion API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<PageIcon>,
    pub parent: PageParent,
    pub properties: BTreeMap<String, PropertyValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageIcon {
    External { external: ExternalFile },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalFile {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageParent {
    pub database_id: String,
}

/// The subset of Notion's property-value union this export uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Select { select: SelectOption },
    MultiSelect { multi_select: Vec<SelectOption> },
    Url { url: String },
    RichText { rich_text: Vec<RichTextRun> },
    Title { title: Vec<RichTextRun> },
}

impl PropertyValue {
    fn select(name: &str, color: Option<&str>) -> Self {
        Self::Select {
            select: SelectOption {
                name: name.to_string(),
                color: color.map(str::to_string),
            },
        }
    }

    fn multi_select(names: &[String]) -> Self {
        Self::MultiSelect {
            multi_select: names
                .iter()
                .map(|name| SelectOption {
                    name: name.clone(),
                    color: None,
                })
                .collect(),
        }
    }

    fn url(url: &str) -> Self {
        Self::Url {
            url: url.to_string(),
        }
    }

    fn rich_text(content: &str) -> Self {
        Self::RichText {
            rich_text: vec![RichTextRun::plain(content)],
        }
    }

    fn title(content: &str) -> Self {
        Self::Title {
            title: vec![RichTextRun::plain(content)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A single unformatted text run, duplicated into `plain_text` per the wire
/// format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichTextRun {
    Text {
        text: TextContent,
        annotations: Annotations,
        plain_text: String,
        href: Option<String>,
    },
}

impl RichTextRun {
    fn plain(content: &str) -> Self {
        Self::Text {
            text: TextContent {
                content: content.to_string(),
                link: None,
            },
            annotations: Annotations::default(),
            plain_text: content.to_string(),
            href: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    pub content: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: String,
}

impl Default for Annotations {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            strikethrough: false,
            underline: false,
            code: false,
            color: "default".to_string(),
        }
    }
}

/// Map a company record onto a Notion page-creation payload.
///
/// Pure and deterministic, no I/O. The record is taken at face value; the
/// only rejected input is an empty `database_id`, which would otherwise
/// produce a payload Notion cannot route.
///
/// Seven properties are always present (`Research`, `Domain`, `Website`,
/// `Description`, `Founders`, `Crunchbase`, `Name`); the remaining ones are
/// inserted only when their source field is non-empty. Tags become
/// multi-select options verbatim, order-preserving and without
/// deduplication. The page icon is omitted entirely when the record carries
/// no icon URL.
pub fn build_page_payload(
    database_id: &str,
    record: &CompanyExport,
) -> Result<PagePayload, ExportError> {
    if database_id.is_empty() {
        return Err(ExportError::EmptyDatabaseId);
    }

    let mut properties = BTreeMap::new();
    properties.insert(
        "Research".to_string(),
        PropertyValue::select(RESEARCH_DEFAULT, Some(RESEARCH_COLOR)),
    );
    properties.insert(
        "Domain".to_string(),
        PropertyValue::multi_select(&record.tags),
    );
    properties.insert("Website".to_string(), PropertyValue::url(&record.website));
    properties.insert(
        "Description".to_string(),
        PropertyValue::rich_text(&record.description),
    );
    properties.insert(
        "Founders".to_string(),
        PropertyValue::rich_text(&record.founders.join(", ")),
    );
    properties.insert(
        "Crunchbase".to_string(),
        PropertyValue::url(&record.crunchbase_url),
    );
    properties.insert("Name".to_string(), PropertyValue::title(&record.name));

    let optional_text = [
        ("Founded", &record.founded),
        ("Funding", &record.funding),
        ("Acquired", &record.acquired),
        ("LastFunding", &record.lastfunding),
        ("Stock Symbol", &record.stocksymbol),
    ];
    for (key, value) in optional_text {
        if !value.is_empty() {
            properties.insert(key.to_string(), PropertyValue::rich_text(value));
        }
    }
    if !record.country.is_empty() {
        properties.insert(
            "Country".to_string(),
            PropertyValue::select(&record.country, None),
        );
    }

    let icon = (!record.icon_url.is_empty()).then(|| PageIcon::External {
        external: ExternalFile {
            url: record.icon_url.clone(),
        },
    });

    Ok(PagePayload {
        icon,
        parent: PageParent {
            database_id: database_id.to_string(),
        },
        properties,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const MANDATORY_KEYS: [&str; 7] = [
        "Research",
        "Domain",
        "Website",
        "Description",
        "Founders",
        "Crunchbase",
        "Name",
    ];

    fn full_record() -> CompanyExport {
        CompanyExport {
            name: "Acme".to_string(),
            website: "https://acme.io".to_string(),
            crunchbase_url: "https://cb.io/acme".to_string(),
            icon_url: "https://x/i.png".to_string(),
            description: "desc".to_string(),
            funding: "$1M".to_string(),
            country: String::new(),
            founded: "2020".to_string(),
            lastfunding: String::new(),
            stocksymbol: String::new(),
            acquired: String::new(),
            founders: vec!["Jo".to_string()],
            tags: vec!["saas".to_string()],
        }
    }

    fn plain_text_of(payload: &PagePayload, key: &str) -> String {
        match &payload.properties[key] {
            PropertyValue::RichText { rich_text } => match &rich_text[0] {
                RichTextRun::Text { plain_text, .. } => plain_text.clone(),
            },
            other => panic!("{key} is not rich text: {other:?}"),
        }
    }

    #[test]
    fn test_empty_database_id_rejected() {
        let err = build_page_payload("", &full_record()).unwrap_err();
        assert_eq!(err, ExportError::EmptyDatabaseId);
    }

    #[test]
    fn test_deterministic() {
        let record = full_record();
        let a = build_page_payload("db1", &record).unwrap();
        let b = build_page_payload("db1", &record).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_value(&a).unwrap(),
            serde_json::to_value(&b).unwrap()
        );
    }

    #[test]
    fn test_mandatory_keys_always_present() {
        let payload = build_page_payload("db1", &CompanyExport::default()).unwrap();
        for key in MANDATORY_KEYS {
            assert!(payload.properties.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn test_optional_fields_absent_when_empty() {
        let payload = build_page_payload("db1", &CompanyExport::default()).unwrap();
        for key in [
            "Founded",
            "Funding",
            "Acquired",
            "LastFunding",
            "Stock Symbol",
            "Country",
        ] {
            assert!(!payload.properties.contains_key(key), "unexpected {key}");
        }
        assert_eq!(payload.properties.len(), MANDATORY_KEYS.len());
    }

    #[test]
    fn test_optional_fields_present_when_set() {
        let record = CompanyExport {
            founded: "2020".to_string(),
            funding: "$1M".to_string(),
            acquired: "2023".to_string(),
            lastfunding: "Series A".to_string(),
            stocksymbol: "ACME".to_string(),
            country: "Germany".to_string(),
            ..CompanyExport::default()
        };
        let payload = build_page_payload("db1", &record).unwrap();
        assert_eq!(plain_text_of(&payload, "Founded"), "2020");
        assert_eq!(plain_text_of(&payload, "Funding"), "$1M");
        assert_eq!(plain_text_of(&payload, "Acquired"), "2023");
        assert_eq!(plain_text_of(&payload, "LastFunding"), "Series A");
        assert_eq!(plain_text_of(&payload, "Stock Symbol"), "ACME");
        assert_eq!(
            payload.properties["Country"],
            PropertyValue::select("Germany", None)
        );
    }

    #[test]
    fn test_founders_joined() {
        let record = CompanyExport {
            founders: vec!["Alice".to_string(), "Bob".to_string()],
            ..CompanyExport::default()
        };
        let payload = build_page_payload("db1", &record).unwrap();
        assert_eq!(plain_text_of(&payload, "Founders"), "Alice, Bob");
    }

    #[test]
    fn test_no_founders_is_empty_run_not_omitted() {
        let payload = build_page_payload("db1", &CompanyExport::default()).unwrap();
        assert_eq!(plain_text_of(&payload, "Founders"), "");
    }

    #[test]
    fn test_tags_verbatim_ordered_not_deduplicated() {
        let record = CompanyExport {
            tags: vec![
                "fintech".to_string(),
                "ai".to_string(),
                "Fintech".to_string(),
                "ai".to_string(),
            ],
            ..CompanyExport::default()
        };
        let payload = build_page_payload("db1", &record).unwrap();
        let json = serde_json::to_value(&payload.properties["Domain"]).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "multi_select",
                "multi_select": [
                    { "name": "fintech" },
                    { "name": "ai" },
                    { "name": "Fintech" },
                    { "name": "ai" },
                ],
            })
        );
    }

    #[test]
    fn test_icon_omitted_without_url() {
        let payload = build_page_payload("db1", &CompanyExport::default()).unwrap();
        assert!(payload.icon.is_none());
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("icon").is_none());
    }

    // Field values are taken verbatim; only the empty string drops the icon.
    #[test]
    fn test_whitespace_icon_url_kept() {
        let record = CompanyExport {
            icon_url: " ".to_string(),
            ..CompanyExport::default()
        };
        let payload = build_page_payload("db1", &record).unwrap();
        assert!(payload.icon.is_some());
    }

    #[test]
    fn test_icon_and_parent() {
        let payload = build_page_payload("db1", &full_record()).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json["icon"],
            json!({ "type": "external", "external": { "url": "https://x/i.png" } })
        );
        assert_eq!(json["parent"], json!({ "database_id": "db1" }));
    }

    #[test]
    fn test_rich_text_wire_shape() {
        let record = CompanyExport {
            description: "desc".to_string(),
            ..CompanyExport::default()
        };
        let payload = build_page_payload("db1", &record).unwrap();
        let json = serde_json::to_value(&payload.properties["Description"]).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "rich_text",
                "rich_text": [{
                    "type": "text",
                    "text": { "content": "desc", "link": null },
                    "annotations": {
                        "bold": false,
                        "italic": false,
                        "strikethrough": false,
                        "underline": false,
                        "code": false,
                        "color": "default",
                    },
                    "plain_text": "desc",
                    "href": null,
                }],
            })
        );
    }

    #[test]
    fn test_title_and_research_wire_shape() {
        let payload = build_page_payload("db1", &full_record()).unwrap();
        let json = serde_json::to_value(&payload.properties["Name"]).unwrap();
        assert_eq!(json["type"], "title");
        assert_eq!(json["title"][0]["text"]["content"], "Acme");
        assert_eq!(json["title"][0]["plain_text"], "Acme");

        let research = serde_json::to_value(&payload.properties["Research"]).unwrap();
        assert_eq!(
            research,
            json!({
                "type": "select",
                "select": { "name": "Not started", "color": "orange" },
            })
        );
    }

    // Mixed optional fields: some set, some empty.
    #[test]
    fn test_example_scenario() {
        let payload = build_page_payload("db1", &full_record()).unwrap();
        assert!(payload.properties.contains_key("Founded"));
        assert!(payload.properties.contains_key("Funding"));
        assert!(!payload.properties.contains_key("Acquired"));
        assert!(!payload.properties.contains_key("Country"));
        assert!(!payload.properties.contains_key("Stock Symbol"));
        assert!(!payload.properties.contains_key("LastFunding"));
        assert_eq!(
            payload.properties["Website"],
            PropertyValue::url("https://acme.io")
        );
        assert_eq!(
            payload.properties["Crunchbase"],
            PropertyValue::url("https://cb.io/acme")
        );
    }

    #[test]
    fn test_input_not_mutated() {
        let record = full_record();
        let copy = record.clone();
        build_page_payload("db1", &record).unwrap();
        assert_eq!(record, copy);
    }
}
