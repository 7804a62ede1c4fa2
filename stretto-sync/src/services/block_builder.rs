//! Block Builder: practice notes rendered as content blocks
//!
//! Pure functions, no I/O. Per entry the order is fixed: tag row, focus
//! callout, content callout, question label and bullets, spacer. The
//! optional blocks are omitted when they would be empty; content and spacer
//! are always emitted.

use stretto_common::model::{Entry, Focus, NoteRecord};
use stretto_common::time::format_time_12h;

use crate::notion::{Color, ContentBlock, HeadingLevel, RichText};

const TAG_PREFIX: &str = "🏷️ ";
const TAG_SEPARATOR: &str = " • ";
const FOCUS_EMOJI: &str = "🎯";
const CONTENT_EMOJI: &str = "💡";
const QUESTIONS_LABEL: &str = "❓ Teacher Questions";

fn tag_row(tags: &[String]) -> Option<ContentBlock> {
    if tags.is_empty() {
        return None;
    }
    let mut rich_text = vec![RichText::plain(TAG_PREFIX)];
    for (i, tag) in tags.iter().enumerate() {
        if i > 0 {
            rich_text.push(RichText::plain(TAG_SEPARATOR));
        }
        rich_text.push(RichText::emphasized(tag.as_str()));
    }
    Some(ContentBlock::Paragraph {
        rich_text,
        color: Color::Default,
    })
}

/// "Focus: Intro, m.1-4, page 1, WTC I"
fn focus_text(focus: &Focus) -> String {
    let non_blank = |part: &Option<String>| {
        part.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let parts: Vec<String> = [
        non_blank(&focus.section),
        non_blank(&focus.measures),
        non_blank(&focus.page).map(|page| format!("page {}", page)),
        non_blank(&focus.book),
    ]
    .into_iter()
    .flatten()
    .collect();

    format!("Focus: {}", parts.join(", "))
}

fn focus_callout(focus: Option<&Focus>) -> Option<ContentBlock> {
    let focus = focus.filter(|f| !f.is_empty())?;
    Some(ContentBlock::callout(FOCUS_EMOJI, focus_text(focus), Color::BlueBackground))
}

/// Blocks for one entry
pub fn build_entry_blocks(entry: &Entry) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();

    blocks.extend(tag_row(&entry.tags));
    blocks.extend(focus_callout(entry.focus.as_ref()));
    blocks.push(ContentBlock::callout(
        CONTENT_EMOJI,
        entry.content.as_str(),
        Color::YellowBackground,
    ));

    let questions: Vec<&str> = entry
        .teacher_questions
        .iter()
        .map(|q| q.trim())
        .filter(|q| !q.is_empty())
        .collect();
    if !questions.is_empty() {
        blocks.push(ContentBlock::paragraph(QUESTIONS_LABEL));
        blocks.extend(questions.into_iter().map(ContentBlock::bullet));
    }

    blocks.push(ContentBlock::spacer());
    blocks
}

/// Session header text, e.g. "🕒 9:05 AM — Practice Session (30 min)"
pub fn session_header(note: &NoteRecord) -> String {
    let title = format!("Practice Session ({} min)", note.duration_minutes);
    match note.time.as_deref().and_then(format_time_12h) {
        Some(clock) => format!("🕒 {} — {}", clock, title),
        None => title,
    }
}

/// Header followed by every entry's blocks, in entry order
pub fn build_note_blocks(note: &NoteRecord) -> Vec<ContentBlock> {
    let mut blocks = vec![ContentBlock::heading(HeadingLevel::Three, session_header(note))];
    for entry in &note.entries {
        blocks.extend(build_entry_blocks(entry));
    }
    blocks
}

/// All notes of one day, concatenated in the given order
pub fn build_day_blocks(notes: &[NoteRecord]) -> Vec<ContentBlock> {
    notes.iter().flat_map(build_note_blocks).collect()
}

/// Collapsible container labeled with the date
pub fn date_section(date: &str, blocks: Vec<ContentBlock>) -> ContentBlock {
    ContentBlock::toggle(date, blocks)
}
