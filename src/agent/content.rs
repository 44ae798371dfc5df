//! Rich-content blocks for conversational responses.
//!
//! Builders are pure: they construct well-formed content blocks from typed
//! arguments, validating nothing beyond the mandatory fields per type. The
//! dispatcher and formatter never look inside a block; it travels untouched
//! inside `payload.richContent`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// A single block inside a rich-content group, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Info(InfoCard),
    Image(Image),
    Button(Button),
    List(ListBlock),
    Table(Table),
    Accordion(Accordion),
    Divider,
    Chips(Chips),
}

impl ContentBlock {
    /// A horizontal divider. The only block with no fields.
    pub fn divider() -> Self {
        Self::Divider
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Nested image reference used by info cards and accordions:
/// `{"src": {"rawUrl": "..."}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    pub src: ImageSrc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSrc {
    pub raw_url: String,
}

impl ImageSource {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            src: ImageSrc {
                raw_url: url.into(),
            },
        }
    }
}

/// Link rendered inside an info card's `actionLink` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLink {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub postback: Option<String>,
}

impl ActionLink {
    pub fn new(text: impl Into<String>, postback: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            postback: Some(postback.into()),
        }
    }
}

/// Informational card. Title is mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoCard {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<ImageSource>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub action_link: Option<Vec<ActionLink>>,
}

impl InfoCard {
    pub fn new(title: impl Into<String>) -> Result<Self, ValidationError> {
        let title = title.into();
        require_text("title", &title)?;
        Ok(Self {
            title,
            subtitle: None,
            image: None,
            text: None,
            action_link: None,
        })
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image = Some(ImageSource::from_url(url));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_action_link(mut self, link: ActionLink) -> Self {
        self.action_link.get_or_insert_with(Vec::new).push(link);
        self
    }
}

impl From<InfoCard> for ContentBlock {
    fn from(card: InfoCard) -> Self {
        Self::Info(card)
    }
}

/// Standalone image. Both `rawUrl` and `accessibilityText` are mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub raw_url: String,
    pub accessibility_text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
}

impl Image {
    pub fn new(
        raw_url: impl Into<String>,
        accessibility_text: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let raw_url = raw_url.into();
        let accessibility_text = accessibility_text.into();
        require_text("rawUrl", &raw_url)?;
        require_text("accessibilityText", &accessibility_text)?;
        Ok(Self {
            raw_url,
            accessibility_text,
            title: None,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl From<Image> for ContentBlock {
    fn from(image: Image) -> Self {
        Self::Image(image)
    }
}

/// Icon attached to a button: `{"type": "<material icon name>"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonIcon {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Clickable button. Text is mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub icon: Option<ButtonIcon>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub event: Option<Map<String, Value>>,
}

impl Button {
    pub fn new(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        require_text("text", &text)?;
        Ok(Self {
            text,
            icon: None,
            link: None,
            event: None,
        })
    }

    pub fn with_icon(mut self, kind: impl Into<String>) -> Self {
        self.icon = Some(ButtonIcon { kind: kind.into() });
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_event(mut self, event: Map<String, Value>) -> Self {
        self.event = Some(event);
        self
    }
}

impl From<Button> for ContentBlock {
    fn from(button: Button) -> Self {
        Self::Button(button)
    }
}

/// Entry in a list block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub event: Option<Map<String, Value>>,
}

impl ListItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            event: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }
}

/// Selectable list. Title is mandatory; items may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListBlock {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subtitle: Option<String>,
    pub items: Vec<ListItem>,
}

impl ListBlock {
    pub fn new(title: impl Into<String>) -> Result<Self, ValidationError> {
        let title = title.into();
        require_text("title", &title)?;
        Ok(Self {
            title,
            subtitle: None,
            items: Vec::new(),
        })
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_item(mut self, item: ListItem) -> Self {
        self.items.push(item);
        self
    }
}

impl From<ListBlock> for ContentBlock {
    fn from(list: ListBlock) -> Self {
        Self::List(list)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProperties {
    pub header: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

/// Tabular block. Title is mandatory; `rows` is always emitted, even empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub column_properties: Option<Vec<ColumnProperties>>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn new(title: impl Into<String>) -> Result<Self, ValidationError> {
        let title = title.into();
        require_text("title", &title)?;
        Ok(Self {
            title,
            subtitle: None,
            column_properties: None,
            rows: Vec::new(),
        })
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_properties = Some(
            headers
                .into_iter()
                .map(|h| ColumnProperties { header: h.into() })
                .collect(),
        );
        self
    }

    pub fn with_row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(TableRow {
            cells: cells
                .into_iter()
                .map(|c| TableCell { text: c.into() })
                .collect(),
        });
        self
    }
}

impl From<Table> for ContentBlock {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

/// Collapsible accordion. Title is mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accordion {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<ImageSource>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,
}

impl Accordion {
    pub fn new(title: impl Into<String>) -> Result<Self, ValidationError> {
        let title = title.into();
        require_text("title", &title)?;
        Ok(Self {
            title,
            subtitle: None,
            image: None,
            text: None,
        })
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image = Some(ImageSource::from_url(url));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl From<Accordion> for ContentBlock {
    fn from(accordion: Accordion) -> Self {
        Self::Accordion(accordion)
    }
}

/// Single suggestion chip: `{"text": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChipOption {
    pub text: String,
}

/// Suggestion chips. At least one option, every option non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chips {
    pub options: Vec<ChipOption>,
}

impl Chips {
    pub fn new(options: Vec<ChipOption>) -> Result<Self, ValidationError> {
        if options.is_empty() {
            return Err(ValidationError::ListTooShort {
                field: "options".to_string(),
                min: 1,
                actual: 0,
            });
        }
        for option in &options {
            require_text("text", &option.text)?;
        }
        Ok(Self { options })
    }

    /// Build chips straight from suggestion texts.
    pub fn from_texts<I, S>(texts: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            texts
                .into_iter()
                .map(|t| ChipOption { text: t.into() })
                .collect(),
        )
    }
}

impl From<Chips> for ContentBlock {
    fn from(chips: Chips) -> Self {
        Self::Chips(chips)
    }
}

/// Ordered groups of content blocks, serialized as the array-of-arrays
/// under the `richContent` payload key. Block order within a group and
/// group order are both preserved; visual grouping is the renderer's call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichContent {
    pub groups: Vec<Vec<ContentBlock>>,
}

impl RichContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a group of blocks rendered together.
    pub fn with_group<I, B>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<ContentBlock>,
    {
        self.groups.push(blocks.into_iter().map(Into::into).collect());
        self
    }

    /// Append a single block as its own group.
    pub fn with_block(mut self, block: impl Into<ContentBlock>) -> Self {
        self.groups.push(vec![block.into()]);
        self
    }

    /// A carousel is a group of info cards rendered side by side.
    pub fn with_carousel(self, cards: Vec<InfoCard>) -> Self {
        self.with_group(cards)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn info_card_serializes_with_camel_case_and_omitted_keys() {
        let card = InfoCard::new("Portfolio")
            .unwrap()
            .with_subtitle("Overview")
            .with_image_url("https://example.com/p.png")
            .with_action_link(ActionLink::new("Details", "https://example.com/d"));
        let value = serde_json::to_value(ContentBlock::from(card)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "info",
                "title": "Portfolio",
                "subtitle": "Overview",
                "image": {"src": {"rawUrl": "https://example.com/p.png"}},
                "actionLink": [{"text": "Details", "postback": "https://example.com/d"}],
            })
        );
    }

    #[test]
    fn info_card_requires_title() {
        let err = InfoCard::new("   ").unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn image_requires_url_and_accessibility_text() {
        assert!(Image::new("", "alt").is_err());
        assert!(Image::new("https://example.com/i.png", "").is_err());

        let value =
            serde_json::to_value(ContentBlock::from(Image::new("https://example.com/i.png", "alt").unwrap()))
                .unwrap();
        assert_eq!(
            value,
            json!({
                "type": "image",
                "rawUrl": "https://example.com/i.png",
                "accessibilityText": "alt",
            })
        );
    }

    #[test]
    fn button_icon_uses_type_key() {
        let button = Button::new("Buy")
            .unwrap()
            .with_icon("shopping_cart")
            .with_link("https://example.com/buy");
        let value = serde_json::to_value(ContentBlock::from(button)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "button",
                "text": "Buy",
                "icon": {"type": "shopping_cart"},
                "link": "https://example.com/buy",
            })
        );
    }

    #[test]
    fn table_always_emits_rows() {
        let table = Table::new("Holdings").unwrap().with_headers(["Symbol", "Qty"]);
        let value = serde_json::to_value(ContentBlock::from(table)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "table",
                "title": "Holdings",
                "columnProperties": [{"header": "Symbol"}, {"header": "Qty"}],
                "rows": [],
            })
        );
    }

    #[test]
    fn table_rows_wrap_cells() {
        let table = Table::new("Holdings")
            .unwrap()
            .with_row(["AAPL", "10"])
            .with_row(["MSFT", "5"]);
        let value = serde_json::to_value(table).unwrap();
        assert_eq!(
            value["rows"],
            json!([
                {"cells": [{"text": "AAPL"}, {"text": "10"}]},
                {"cells": [{"text": "MSFT"}, {"text": "5"}]},
            ])
        );
    }

    #[test]
    fn chips_reject_empty_options() {
        assert!(Chips::new(vec![]).is_err());
        assert!(Chips::from_texts(["Yes", ""]).is_err());

        let chips = Chips::from_texts(["Yes", "No"]).unwrap();
        let value = serde_json::to_value(ContentBlock::from(chips)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "chips",
                "options": [{"text": "Yes"}, {"text": "No"}],
            })
        );
    }

    #[test]
    fn divider_is_type_only() {
        let value = serde_json::to_value(ContentBlock::divider()).unwrap();
        assert_eq!(value, json!({"type": "divider"}));
    }

    #[test]
    fn rich_content_preserves_group_structure() {
        let content = RichContent::new()
            .with_block(InfoCard::new("Card").unwrap())
            .with_group([ContentBlock::divider(), ContentBlock::divider()]);
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(
            value,
            json!([
                [{"type": "info", "title": "Card"}],
                [{"type": "divider"}, {"type": "divider"}],
            ])
        );
    }

    #[test]
    fn content_block_round_trips_through_json() {
        let original: ContentBlock = ListBlock::new("Choices")
            .unwrap()
            .with_item(ListItem::new("First").with_subtitle("one"))
            .with_item(ListItem::new("Second"))
            .into();
        let value = serde_json::to_value(&original).unwrap();
        let parsed: ContentBlock = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, original);
    }
}
