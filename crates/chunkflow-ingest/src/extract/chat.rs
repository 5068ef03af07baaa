//! Chat-export archive extraction
//!
//! Reads a Slack-style export: a zip whose root holds a `users.json`
//! manifest, a `channels.json` manifest, and one directory per channel with
//! one JSON file per day of messages. The root may sit below a wrapper
//! directory, so it is located by finding the users manifest anywhere in
//! the archive. One chunk is emitted per message, ordered by channel, then
//! day file, then in-file position.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use zip::ZipArchive;

use chunkflow_core::{Chunk, CombineContext, CombineStrategy};

use crate::error::{Error, Result};
use crate::types::ChatMeta;

#[derive(Debug, Deserialize)]
struct UserRecord {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    real_name: Option<String>,
    #[serde(default)]
    profile: Option<UserProfile>,
}

#[derive(Debug, Default, Deserialize)]
struct UserProfile {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    real_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelRecord {
    name: String,
    #[serde(default)]
    purpose: Option<ChannelNote>,
    #[serde(default)]
    topic: Option<ChannelNote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChannelNote {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct MessageRecord {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    reactions: Vec<ReactionRecord>,
}

#[derive(Debug, Deserialize)]
struct ReactionRecord {
    name: String,
    count: u32,
}

/// Extract one chunk per message from a chat-export archive
pub fn extract_chat_export(data: &[u8]) -> Result<Vec<Chunk<ChatMeta>>> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();

    let root = names
        .iter()
        .find_map(|name| {
            name.strip_suffix("users.json")
                .filter(|prefix| prefix.is_empty() || prefix.ends_with('/'))
        })
        .map(str::to_string)
        .ok_or_else(|| Error::invalid_export("users.json not found in archive"))?;

    let channels_manifest = format!("{root}channels.json");
    if !names.iter().any(|name| name == &channels_manifest) {
        return Err(Error::invalid_export(format!(
            "channels.json not found at export root '{root}'"
        )));
    }

    let users: Vec<UserRecord> =
        serde_json::from_str(&read_entry(&mut archive, &format!("{root}users.json"))?)?;
    let display_names: HashMap<String, String> = users
        .into_iter()
        .map(|user| {
            let name = display_name(&user);
            (user.id, name)
        })
        .collect();

    let channels: Vec<ChannelRecord> =
        serde_json::from_str(&read_entry(&mut archive, &channels_manifest)?)?;

    let mention = Regex::new(r"<@([A-Za-z0-9]+)>").expect("Invalid regex");

    let mut chunks = Vec::new();
    for channel in &channels {
        let purpose = note_value(&channel.purpose);
        let topic = note_value(&channel.topic);
        let prefix = format!("{}{}/", root, channel.name);

        let mut day_files: Vec<&String> = names
            .iter()
            .filter(|name| name.starts_with(&prefix) && name.ends_with(".json"))
            .collect();
        day_files.sort();

        for day_file in day_files {
            let stem = day_file
                .rsplit('/')
                .next()
                .unwrap_or(day_file)
                .trim_end_matches(".json");
            let date = NaiveDate::parse_from_str(stem, "%Y-%m-%d")?;

            let messages: Vec<MessageRecord> =
                serde_json::from_str(&read_entry(&mut archive, day_file)?)?;

            for message in messages {
                if message.kind.as_deref() != Some("message") {
                    continue;
                }

                let mut text = mention
                    .replace_all(&message.text, |caps: &regex::Captures| {
                        let id = &caps[1];
                        display_names
                            .get(id)
                            .cloned()
                            .unwrap_or_else(|| id.to_string())
                    })
                    .into_owned();

                if !message.reactions.is_empty() {
                    let summary = message
                        .reactions
                        .iter()
                        .map(|r| format!("{}×{}", r.name, r.count))
                        .collect::<Vec<_>>()
                        .join(", ");
                    text.push('\n');
                    text.push_str(&summary);
                }

                let author = message.user.as_ref().map(|id| {
                    display_names
                        .get(id)
                        .cloned()
                        .unwrap_or_else(|| id.clone())
                });

                chunks.push(Chunk::new(
                    text,
                    ChatMeta {
                        channel: channel.name.clone(),
                        users: author.into_iter().collect(),
                        start_date: date,
                        end_date: date,
                        channel_purpose: purpose.clone(),
                        channel_topic: topic.clone(),
                    },
                ));
            }
        }
    }

    tracing::info!(
        "Extracted {} messages from {} channels",
        chunks.len(),
        channels.len()
    );
    Ok(chunks)
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut file = archive.by_name(name)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

fn note_value(note: &Option<ChannelNote>) -> String {
    note.as_ref().map(|n| n.value.clone()).unwrap_or_default()
}

/// Resolve a display name: profile display name, then real name, then
/// handle, then the raw id
fn display_name(user: &UserRecord) -> String {
    let candidates = [
        user.profile.as_ref().and_then(|p| p.display_name.as_deref()),
        user.profile.as_ref().and_then(|p| p.real_name.as_deref()),
        user.real_name.as_deref(),
        user.name.as_deref(),
    ];
    for candidate in candidates.into_iter().flatten() {
        let trimmed = candidate.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    user.id.clone()
}

/// Merge policy for chat-export chunks
///
/// Merges only within the same channel. A merge that would exceed the
/// budget is declined outright; messages are never split.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChatStrategy;

impl CombineStrategy<ChatMeta> for ChatStrategy {
    fn combine(
        &self,
        first: Chunk<ChatMeta>,
        second: Chunk<ChatMeta>,
        ctx: &CombineContext<'_>,
    ) -> chunkflow_core::Result<Vec<Chunk<ChatMeta>>> {
        if first.metadata.channel != second.metadata.channel {
            return Ok(vec![first, second]);
        }

        let merged_text = format!("{}\n\n{}", first.text, second.text);
        let merged_ids = ctx.tokenizer.encode(&merged_text);
        if merged_ids.len() > ctx.target_chunk_size {
            return Ok(vec![first, second]);
        }

        let mut users: Vec<String> = first
            .metadata
            .users
            .iter()
            .chain(second.metadata.users.iter())
            .cloned()
            .collect();
        users.sort();
        users.dedup();

        let meta = ChatMeta {
            channel: first.metadata.channel.clone(),
            users,
            start_date: first.metadata.start_date.min(second.metadata.start_date),
            end_date: first.metadata.end_date.max(second.metadata.end_date),
            channel_purpose: first.metadata.channel_purpose.clone(),
            channel_topic: first.metadata.channel_topic.clone(),
        };

        Ok(vec![Chunk::with_encoding(merged_text, meta, merged_ids)])
    }
}
