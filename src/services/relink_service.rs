use crate::models::{CatalogRecord, ReconcileSummary, ShareLink};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::warn;

/// Matches both `/file/` and `/embed/` share links. The file id excludes
/// `#`, `/` and `?`; the token is everything after the fragment marker.
static SHARE_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://mega\.nz/(?:file|embed)/([^#/?]+)#(.+)$").unwrap());

/// Lookup table from normalized token to the dump entry that produced it.
pub type LinkTable = HashMap<String, ShareLink>;

/// Normalizes a token so the dump and catalog encodings of the same secret
/// compare equal: trailing `=` padding dropped, `+` -> `-`, `/` -> `_`.
pub fn normalize_token(token: &str) -> String {
    token
        .trim_end_matches('=')
        .replace('+', "-")
        .replace('/', "_")
}

fn parse_share_link(text: &str) -> Option<ShareLink> {
    let caps = SHARE_LINK_RE.captures(text)?;
    Some(ShareLink {
        file_id: caps[1].to_string(),
        token: caps[2].to_string(),
    })
}

/// Builds the lookup table from the raw dump text.
///
/// Blank lines are skipped. Lines that don't look like a share link get a
/// warning with their 1-based line number and are skipped; the run goes on.
/// When two lines normalize to the same token, the later one wins. The
/// original token is kept alongside the file id so the rewritten URL carries
/// the dump's encoding, not the catalog's.
pub fn build_link_table(dump: &str) -> LinkTable {
    let mut table = LinkTable::new();
    for (i, raw) in dump.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match parse_share_link(line) {
            Some(link) => {
                table.insert(normalize_token(&link.token), link);
            }
            None => warn!("line {}: couldn't parse share link: {}", i + 1, line),
        }
    }
    table
}

/// Rewrites the url of every eligible record whose token matches a table
/// entry to `https://mega.nz/embed/<fileId>#<token>`.
///
/// Thumbnail records are never inspected. Records whose url doesn't parse,
/// or whose token has no table entry, are left exactly as they were; that
/// only shows up in the returned counts. Pure in-memory pass, no I/O.
pub fn reconcile(records: &mut [CatalogRecord], table: &LinkTable) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();
    for record in records.iter_mut() {
        if record.is_thumbnail() {
            continue;
        }
        summary.eligible += 1;

        let Some(current) = record.url().and_then(parse_share_link) else {
            continue;
        };
        if let Some(entry) = table.get(&normalize_token(&current.token)) {
            record.set_url(format!(
                "https://mega.nz/embed/{}#{}",
                entry.file_id, entry.token
            ));
            summary.updated += 1;
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(json: &str) -> Vec<CatalogRecord> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn normalize_is_idempotent() {
        for token in ["tok+en/", "abc==", "plain", "a+b/c="] {
            let once = normalize_token(token);
            assert_eq!(normalize_token(&once), once);
        }
    }

    #[test]
    fn padding_and_alphabet_variants_normalize_to_the_same_key() {
        assert_eq!(normalize_token("tok+en/=="), normalize_token("tok-en_"));
        assert_eq!(normalize_token("a/b+c="), normalize_token("a_b-c"));
    }

    #[test]
    fn table_skips_blank_and_malformed_lines() {
        let dump = "\nhttps://mega.nz/file/ABC123#tok+en/\n\nnot a url\n";
        let table = build_link_table(dump);
        assert_eq!(table.len(), 1);
        let entry = &table[&normalize_token("tok+en/")];
        assert_eq!(entry.file_id, "ABC123");
        assert_eq!(entry.token, "tok+en/");
    }

    #[test]
    fn table_accepts_embed_links_too() {
        let table = build_link_table("http://mega.nz/embed/XYZ#secret");
        assert_eq!(table[&normalize_token("secret")].file_id, "XYZ");
    }

    #[test]
    fn later_dump_line_wins_on_a_key_collision() {
        let dump = "https://mega.nz/file/FIRST#tok+en\nhttps://mega.nz/file/SECOND#tok-en";
        let table = build_link_table(dump);
        assert_eq!(table.len(), 1);
        assert_eq!(table[&normalize_token("tok-en")].file_id, "SECOND");
    }

    #[test]
    fn reconcile_rewrites_with_the_dump_token() {
        let table = build_link_table("https://mega.nz/file/ABC123#tok+en/\nnot a url");
        assert_eq!(table.len(), 1);

        let mut records =
            catalog(r#"[{"category":"Clips","url":"https://mega.nz/embed/OLD#tok-en_"}]"#);
        let summary = reconcile(&mut records, &table);

        assert_eq!(summary.updated, 1);
        assert_eq!(summary.eligible, 1);
        assert_eq!(records[0].url(), Some("https://mega.nz/embed/ABC123#tok+en/"));
    }

    #[test]
    fn thumbnail_records_are_never_touched() {
        let table = build_link_table("https://mega.nz/file/NEW#tok");
        let raw = r#"[{"category":"thumbnails","url":"https://mega.nz/file/OLD#tok","w":9}]"#;
        let mut records = catalog(raw);
        let summary = reconcile(&mut records, &table);

        assert_eq!(summary.eligible, 0);
        assert_eq!(summary.updated, 0);
        assert_eq!(serde_json::to_string(&records).unwrap(), raw);
    }

    #[test]
    fn unmatched_url_is_left_byte_for_byte() {
        let table = build_link_table("https://mega.nz/file/NEW#tok");
        let raw = r#"[{"category":"Clips","url":"https://example.com/video.mp4","n":"x"}]"#;
        let mut records = catalog(raw);
        let summary = reconcile(&mut records, &table);

        assert_eq!(summary.eligible, 1);
        assert_eq!(summary.updated, 0);
        assert_eq!(serde_json::to_string(&records).unwrap(), raw);
    }

    #[test]
    fn unknown_token_is_left_unchanged() {
        let table = build_link_table("https://mega.nz/file/NEW#othertoken");
        let raw = r#"[{"category":"Clips","url":"https://mega.nz/embed/OLD#mytoken"}]"#;
        let mut records = catalog(raw);
        let summary = reconcile(&mut records, &table);

        assert_eq!(summary.updated, 0);
        assert_eq!(records[0].url(), Some("https://mega.nz/embed/OLD#mytoken"));
    }

    #[test]
    fn eligible_counts_every_non_thumbnail_record() {
        let table = LinkTable::new();
        let mut records = catalog(
            r#"[
                {"category":"Clips","url":"a"},
                {"category":"Thumbnails","url":"b"},
                {"category":"Shorts","url":"c"},
                {"category":"THUMBNAILS","url":"d"},
                {"other":"no category at all"}
            ]"#,
        );
        let summary = reconcile(&mut records, &table);
        assert_eq!(summary.eligible, 3);
        assert_eq!(summary.updated, 0);
        assert!(summary.updated <= summary.eligible);
    }
}
