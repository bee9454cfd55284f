//! Feed parsing shared by the news, video, and forum adapters.
//!
//! Handles both feed schemas seen in the wild: RSS 2.0 (`<item>` with
//! `<title>`/`<link>`/`<pubDate>` text nodes) and Atom (`<entry>` with a
//! `<link href="...">` attribute and `<published>`/`<updated>`).

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::EngineError;

/// One feed item, schema-independent.
#[derive(Debug, Clone)]
pub(crate) struct FeedEntry {
    pub(crate) title: String,
    pub(crate) link: String,
    /// Raw timestamp string as the feed carried it (RFC 2822 or RFC 3339).
    pub(crate) published: Option<String>,
}

/// Parse an RSS or Atom document into [`FeedEntry`]s.
///
/// Stops after `max_entries` complete entries.
///
/// # Errors
///
/// Returns [`EngineError::Xml`] if the XML is malformed.
pub(crate) fn parse_feed_entries(
    xml: &str,
    max_entries: usize,
) -> Result<Vec<FeedEntry>, EngineError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut in_entry = false;
    let mut current_tag = String::new();
    let mut title = String::new();
    let mut link = String::new();
    let mut published = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name_buf = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_buf).unwrap_or("").to_string();
                match name.as_str() {
                    "item" | "entry" => {
                        in_entry = true;
                        title.clear();
                        link.clear();
                        published.clear();
                    }
                    "link" if in_entry => {
                        // Atom carries the target in an href attribute.
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"href" {
                                link = String::from_utf8_lossy(attr.value.as_ref()).to_string();
                            }
                        }
                        current_tag = name;
                    }
                    _ => current_tag = name,
                }
            }
            Ok(Event::Empty(e)) => {
                if in_entry {
                    let name_buf = e.name().as_ref().to_vec();
                    let name = std::str::from_utf8(&name_buf).unwrap_or("");
                    if name == "link" {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"href" {
                                link = String::from_utf8_lossy(attr.value.as_ref()).to_string();
                            }
                        }
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if in_entry {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    match current_tag.as_str() {
                        "title" => title = text,
                        // RSS puts the URL in a text node.
                        "link" if link.is_empty() => link = text,
                        "pubDate" | "published" | "updated" => {
                            if published.is_empty() {
                                published = text;
                            }
                        }
                        _ => {}
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if in_entry && current_tag == "title" {
                    title = String::from_utf8_lossy(e.as_ref()).into_owned();
                }
            }
            Ok(Event::End(e)) => {
                let name_buf = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_buf).unwrap_or("");
                if (name == "item" || name == "entry") && in_entry {
                    in_entry = false;
                    if !title.is_empty() && !link.is_empty() {
                        entries.push(FeedEntry {
                            title: title.clone(),
                            link: link.clone(),
                            published: if published.is_empty() {
                                None
                            } else {
                                Some(published.clone())
                            },
                        });
                        if entries.len() >= max_entries {
                            break;
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(EngineError::Xml(e)),
            _ => {}
        }
    }

    Ok(entries)
}

/// Parse a feed timestamp, accepting RFC 2822 (RSS) then RFC 3339 (Atom).
pub(crate) fn parse_feed_timestamp(raw: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc2822(raw)
        .or_else(|_| chrono::DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .ok()
}
