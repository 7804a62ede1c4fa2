//! Typed content blocks
//!
//! Outgoing blocks are built as [`ContentBlock`] values and serialized into
//! the document API's wire shape:
//! `{"object":"block","type":<kind>,<kind>:{...payload}}`.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

/// Longest `text.content` the API accepts in one rich text run
pub const MAX_TEXT_LEN: usize = 2000;

/// Most blocks the API accepts in one children array
pub const MAX_CHILDREN_PER_APPEND: usize = 100;

/// Background/text color of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    BlueBackground,
    YellowBackground,
    GrayBackground,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Default => "default",
            Color::BlueBackground => "blue_background",
            Color::YellowBackground => "yellow_background",
            Color::GrayBackground => "gray_background",
        }
    }
}

/// One run of text with optional annotations
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RichText {
    pub content: String,
    pub bold: bool,
    pub underline: bool,
}

impl RichText {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn emphasized(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            bold: true,
            underline: true,
        }
    }

    /// Unannotated runs of at most [`MAX_TEXT_LEN`] characters each
    ///
    /// Empty input still gives one empty run.
    pub fn split_plain(content: impl Into<String>) -> Vec<Self> {
        let content = content.into();
        if content.chars().count() <= MAX_TEXT_LEN {
            return vec![Self::plain(content)];
        }
        let chars: Vec<char> = content.chars().collect();
        chars
            .chunks(MAX_TEXT_LEN)
            .map(|chunk| Self::plain(chunk.iter().collect::<String>()))
            .collect()
    }

    /// Length as counted against [`MAX_TEXT_LEN`]
    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    fn to_json(&self) -> Value {
        let mut text = json!({
            "type": "text",
            "text": { "content": self.content },
        });
        if self.bold || self.underline {
            text["annotations"] = json!({ "bold": self.bold, "underline": self.underline });
        }
        text
    }
}

/// Heading size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    One,
    Two,
    Three,
}

/// One renderable unit of page content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    Paragraph {
        rich_text: Vec<RichText>,
        color: Color,
    },
    Callout {
        rich_text: Vec<RichText>,
        emoji: String,
        color: Color,
    },
    BulletedListItem {
        rich_text: Vec<RichText>,
    },
    Heading {
        level: HeadingLevel,
        rich_text: Vec<RichText>,
        toggleable: bool,
    },
    /// Collapsible container
    Toggle {
        rich_text: Vec<RichText>,
        children: Vec<ContentBlock>,
    },
}

impl ContentBlock {
    pub fn paragraph(text: impl Into<String>) -> Self {
        ContentBlock::Paragraph {
            rich_text: RichText::split_plain(text),
            color: Color::Default,
        }
    }

    /// Empty paragraph used as visual separation
    pub fn spacer() -> Self {
        ContentBlock::Paragraph {
            rich_text: Vec::new(),
            color: Color::Default,
        }
    }

    pub fn callout(emoji: &str, text: impl Into<String>, color: Color) -> Self {
        ContentBlock::Callout {
            rich_text: RichText::split_plain(text),
            emoji: emoji.to_string(),
            color,
        }
    }

    pub fn bullet(text: impl Into<String>) -> Self {
        ContentBlock::BulletedListItem {
            rich_text: RichText::split_plain(text),
        }
    }

    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        ContentBlock::Heading {
            level,
            rich_text: vec![RichText::plain(text)],
            toggleable: false,
        }
    }

    pub fn toggle(label: impl Into<String>, children: Vec<ContentBlock>) -> Self {
        ContentBlock::Toggle {
            rich_text: vec![RichText::plain(label)],
            children,
        }
    }

    /// Wire name of the block type
    pub fn kind(&self) -> &'static str {
        match self {
            ContentBlock::Paragraph { .. } => "paragraph",
            ContentBlock::Callout { .. } => "callout",
            ContentBlock::BulletedListItem { .. } => "bulleted_list_item",
            ContentBlock::Heading { level, .. } => match level {
                HeadingLevel::One => "heading_1",
                HeadingLevel::Two => "heading_2",
                HeadingLevel::Three => "heading_3",
            },
            ContentBlock::Toggle { .. } => "toggle",
        }
    }

    pub fn rich_text(&self) -> &[RichText] {
        match self {
            ContentBlock::Paragraph { rich_text, .. }
            | ContentBlock::Callout { rich_text, .. }
            | ContentBlock::BulletedListItem { rich_text }
            | ContentBlock::Heading { rich_text, .. }
            | ContentBlock::Toggle { rich_text, .. } => rich_text,
        }
    }

    /// Concatenated text of the block itself (children excluded)
    pub fn plain_text(&self) -> String {
        self.rich_text().iter().map(|t| t.content.as_str()).collect()
    }

    pub fn children(&self) -> &[ContentBlock] {
        match self {
            ContentBlock::Toggle { children, .. } => children,
            _ => &[],
        }
    }

    /// Kind-specific payload, without nested children
    pub fn payload(&self) -> Value {
        let rich_text: Vec<Value> = self.rich_text().iter().map(RichText::to_json).collect();
        match self {
            ContentBlock::Paragraph { color, .. } => {
                let mut payload = json!({ "rich_text": rich_text });
                if *color != Color::Default {
                    payload["color"] = json!(color.as_str());
                }
                payload
            }
            ContentBlock::Callout { emoji, color, .. } => json!({
                "icon": { "type": "emoji", "emoji": emoji },
                "rich_text": rich_text,
                "color": color.as_str(),
            }),
            ContentBlock::BulletedListItem { .. } => json!({ "rich_text": rich_text }),
            ContentBlock::Heading { toggleable, .. } => json!({
                "rich_text": rich_text,
                "is_toggleable": toggleable,
                "color": Color::Default.as_str(),
            }),
            ContentBlock::Toggle { .. } => json!({
                "rich_text": rich_text,
                "color": Color::Default.as_str(),
            }),
        }
    }

    /// Full wire representation, nested children included
    pub fn to_json(&self) -> Value {
        let mut payload = self.payload();
        let children = self.children();
        if !children.is_empty() {
            payload["children"] = Value::Array(children.iter().map(ContentBlock::to_json).collect());
        }

        let mut block = Map::new();
        block.insert("object".to_string(), json!("block"));
        block.insert("type".to_string(), json!(self.kind()));
        block.insert(self.kind().to_string(), payload);
        Value::Object(block)
    }
}

impl Serialize for ContentBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
