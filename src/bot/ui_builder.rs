//! UI Builder module for formatting member tables and user mentions

use teloxide::utils::html::escape;

use crate::localization::{t, t_args};
use crate::models::Member;

const NAME_COLUMN_MAX: usize = 16;
const CLASS_COLUMN_MAX: usize = 12;

/// HTML mention of a user, labelled with `label`
pub fn user_mention(user_id: i64, label: &str) -> String {
    format!("<a href=\"tg://user?id={}\">{}</a>", user_id, escape(label))
}

/// Mention of the user who registered `member`, labelled with the member's name
pub fn member_mention(member: &Member) -> String {
    user_mention(member.added_by, &member.first_name)
}

fn fit(value: &str, max: usize) -> String {
    if value.chars().count() > max {
        let cut: String = value.chars().take(max - 1).collect();
        format!("{cut}…")
    } else {
        value.to_string()
    }
}

/// Monospaced name/class/age table split into `<pre>` pages of at most
/// `max_chars` characters each
///
/// Every page repeats the column header; only the first carries the title.
pub fn format_member_pages(members: &[Member], max_chars: usize) -> Vec<String> {
    let rows: Vec<(String, String, String)> = members
        .iter()
        .map(|m| {
            (
                fit(&m.first_name, NAME_COLUMN_MAX),
                fit(&m.class_name, CLASS_COLUMN_MAX),
                m.age.to_string(),
            )
        })
        .collect();

    let header = (t("list-header-name"), t("list-header-class"), t("list-header-age"));
    let name_width = rows
        .iter()
        .map(|r| r.0.chars().count())
        .chain(std::iter::once(header.0.chars().count()))
        .max()
        .unwrap_or(0);
    let class_width = rows
        .iter()
        .map(|r| r.1.chars().count())
        .chain(std::iter::once(header.1.chars().count()))
        .max()
        .unwrap_or(0);

    let header_line = escape(&format!(
        "{:<name_width$}  {:<class_width$}  {}",
        header.0, header.1, header.2
    ));
    let lines: Vec<String> = rows
        .iter()
        .map(|(name, class, age)| escape(&format!("{name:<name_width$}  {class:<class_width$}  {age}")))
        .collect();

    let title = format!(
        "{}\n",
        escape(&t_args("list-title", &[("count", &members.len().to_string())]))
    );

    let mut pages = Vec::new();
    let mut prefix = title.as_str();
    let mut body: Vec<&str> = Vec::new();
    let mut used = page_overhead(prefix, &header_line);

    for line in &lines {
        let line_len = line.chars().count() + 1;
        if !body.is_empty() && used + line_len > max_chars {
            pages.push(render_page(prefix, &header_line, &body));
            prefix = "";
            body.clear();
            used = page_overhead(prefix, &header_line);
        }
        body.push(line);
        used += line_len;
    }
    if !body.is_empty() || pages.is_empty() {
        pages.push(render_page(prefix, &header_line, &body));
    }

    pages
}

fn render_page(prefix: &str, header_line: &str, body: &[&str]) -> String {
    let mut table = header_line.to_string();
    for line in body {
        table.push('\n');
        table.push_str(line);
    }
    format!("{prefix}<pre>{table}</pre>")
}

fn page_overhead(prefix: &str, header_line: &str) -> usize {
    prefix.chars().count() + header_line.chars().count() + "<pre></pre>".len()
}

/// Split plain text into messages of at most `max_chars` characters,
/// breaking at whitespace where possible
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut pages = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for piece in text.split_inclusive(char::is_whitespace) {
        let word_len = piece.trim_end().chars().count();
        if current_len > 0 && current_len + word_len > max_chars {
            push_page(&mut pages, &current);
            current.clear();
            current_len = 0;
        }

        if word_len > max_chars {
            // A single word longer than a message is cut mid-word
            let mut chars: Vec<char> = piece.chars().collect();
            while chars.len() > max_chars {
                let rest = chars.split_off(max_chars);
                push_page(&mut pages, &chars.iter().collect::<String>());
                chars = rest;
            }
            current_len = chars.len();
            current = chars.into_iter().collect();
        } else {
            current.push_str(piece);
            current_len += piece.chars().count();
        }
    }
    push_page(&mut pages, &current);

    if pages.is_empty() {
        pages.push(text.to_string());
    }
    pages
}

fn push_page(pages: &mut Vec<String>, page: &str) {
    let page = page.trim();
    if !page.is_empty() {
        pages.push(page.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_MESSAGE_CHARS;

    fn member(id: i64, name: &str, class: &str, age: i64) -> Member {
        Member {
            id,
            scope_id: Some(-100),
            first_name: name.to_string(),
            class_name: class.to_string(),
            age,
            added_by: 1000 + id,
            created_at: None,
        }
    }

    #[test]
    fn test_user_mention_escapes_label() {
        assert_eq!(
            user_mention(42, "<b>"),
            "<a href=\"tg://user?id=42\">&lt;b&gt;</a>"
        );
    }

    #[test]
    fn test_member_mention_uses_registrar() {
        let m = member(7, "Swayam", "BTECH", 18);
        assert_eq!(member_mention(&m), "<a href=\"tg://user?id=1007\">Swayam</a>");
    }

    #[test]
    fn test_member_table_rows() {
        let members = vec![member(1, "Swayam", "BTECH", 18), member(2, "Al", "A&B", 40)];
        let pages = format_member_pages(&members, MAX_MESSAGE_CHARS);

        assert_eq!(pages.len(), 1);
        let table = &pages[0];
        assert!(table.starts_with("📋 Registered members (2):\n<pre>Name"));
        assert!(table.ends_with("</pre>"));
        assert!(table.contains("Swayam"));
        assert!(table.contains("A&amp;B"));
        assert_eq!(table.matches('\n').count(), 3);
    }

    #[test]
    fn test_member_table_pages_stay_under_limit() {
        let members: Vec<Member> = (1..=200)
            .map(|id| member(id, "Abcdefghijklmnopqrstu", "ComputerScie", 18))
            .collect();
        let pages = format_member_pages(&members, MAX_MESSAGE_CHARS);

        assert!(pages.len() > 1);
        assert!(pages[0].starts_with("📋 Registered members (200):"));
        for page in &pages {
            assert!(page.chars().count() <= MAX_MESSAGE_CHARS, "page is {} chars", page.chars().count());
            assert!(page.contains("<pre>Name"));
            assert!(page.ends_with("</pre>"));
        }
        assert!(!pages[1].contains("Registered members"));

        let rows: usize = pages.iter().map(|p| p.matches("ComputerScie").count()).sum();
        assert_eq!(rows, 200);
    }

    #[test]
    fn test_split_text_breaks_at_whitespace() {
        assert_eq!(split_text("one two three", 7), vec!["one two", "three"]);
        assert_eq!(split_text("short", 4096), vec!["short"]);
        assert_eq!(split_text("title\n\nbody text", 4096), vec!["title\n\nbody text"]);
    }

    #[test]
    fn test_split_text_long_word_is_cut() {
        assert_eq!(split_text("abcdefgh ij", 3), vec!["abc", "def", "gh", "ij"]);
    }

    #[test]
    fn test_split_text_keeps_every_word() {
        let text = vec!["photosynthesis"; 1000].join(" ");
        let pages = split_text(&text, MAX_MESSAGE_CHARS);

        assert!(pages.len() > 1);
        assert!(pages.iter().all(|p| p.chars().count() <= MAX_MESSAGE_CHARS));
        assert_eq!(pages.join(" "), text);
    }

    #[test]
    fn test_long_values_are_shortened() {
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("abc", 4), "abc");
    }
}
