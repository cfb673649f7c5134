use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Categories offered by the browser, matched upstream against a book's
/// subjects and bookshelves.
pub const CATEGORIES: &[&str] = &[
    "Fiction",
    "Drama",
    "Humor",
    "Politics",
    "Philosophy",
    "History",
    "Adventure",
];

/// MIME prefixes a browser renders inline, in preference order.
/// Charset variants ("text/html; charset=utf-8") match by prefix.
const VIEWABLE_MIME_PREFIXES: &[&str] = &["text/html", "application/pdf", "text/plain"];

/// Cover image MIME prefixes, in preference order.
const COVER_MIME_PREFIXES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// One page of the /books response.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookPage {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Book>,
}

/// Author or translator entry.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
}

/// Catalog entry. Identity is the upstream numeric id; values are never
/// mutated after deserialization.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<Person>,
    #[serde(default)]
    pub translators: Vec<Person>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub bookshelves: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub copyright: Option<bool>,
    #[serde(default)]
    pub media_type: String,
    /// MIME type to download URL, in upstream document order.
    #[serde(default)]
    pub formats: Map<String, Value>,
    #[serde(default)]
    pub download_count: u64,
    #[serde(default)]
    pub summaries: Vec<String>,
}

impl Book {
    /// Cover image URL, preferring jpeg over the other raster formats.
    pub fn cover_url(&self) -> Option<&str> {
        first_matching(&self.formats, COVER_MIME_PREFIXES)
    }

    /// URL of the highest-priority format a browser can render inline.
    pub fn viewable_url(&self) -> Option<&str> {
        first_matching(&self.formats, VIEWABLE_MIME_PREFIXES)
    }

    /// The open action targets the first format entry in document order,
    /// independent of which entry was chosen as the cover.
    pub fn open_target(&self) -> Option<&str> {
        self.formats.iter().next().and_then(|(_, url)| url.as_str())
    }

    /// Author names joined for display.
    pub fn author_line(&self) -> String {
        if self.authors.is_empty() {
            return "unknown".to_string();
        }
        let names: Vec<&str> = self.authors.iter().map(|a| a.name.as_str()).collect();
        names.join(", ")
    }
}

fn first_matching<'a>(formats: &'a Map<String, Value>, prefixes: &[&str]) -> Option<&'a str> {
    for prefix in prefixes {
        for (mime, url) in formats {
            if let Some(url) = url.as_str() {
                if !url.is_empty() && mime.to_ascii_lowercase().starts_with(prefix) {
                    return Some(url);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn book_with_formats(value: Value) -> Book {
        Book {
            id: 1,
            title: "A Book".to_string(),
            formats: value.as_object().cloned().unwrap_or_default(),
            ..Book::default()
        }
    }

    #[test]
    fn parses_a_full_book_object() {
        let book: Book = serde_json::from_value(json!({
            "id": 1342,
            "title": "Pride and Prejudice",
            "authors": [{"name": "Austen, Jane", "birth_year": 1775, "death_year": 1817}],
            "translators": [],
            "subjects": ["Courtship -- Fiction"],
            "bookshelves": ["Best Books Ever Listings"],
            "languages": ["en"],
            "copyright": false,
            "media_type": "Text",
            "formats": {
                "image/jpeg": "https://example.org/1342/cover.jpg",
                "text/html": "https://example.org/1342/book.html"
            },
            "download_count": 43924,
            "summaries": ["A novel of manners."]
        }))
        .unwrap();

        assert_eq!(book.id, 1342);
        assert_eq!(book.authors[0].name, "Austen, Jane");
        assert_eq!(book.authors[0].birth_year, Some(1775));
        assert_eq!(book.copyright, Some(false));
        assert_eq!(book.formats.len(), 2);
    }

    #[test]
    fn missing_optional_fields_default() {
        let book: Book = serde_json::from_value(json!({
            "id": 7,
            "title": "Sparse",
            "copyright": null
        }))
        .unwrap();

        assert!(book.authors.is_empty());
        assert!(book.formats.is_empty());
        assert_eq!(book.copyright, None);
        assert_eq!(book.download_count, 0);
    }

    #[test]
    fn page_envelope_round_trips_next_and_previous() {
        let page: BookPage = serde_json::from_value(json!({
            "count": 2,
            "next": null,
            "previous": "http://example.org/books?page=1",
            "results": []
        }))
        .unwrap();

        assert_eq!(page.count, 2);
        assert_eq!(page.next, None);
        assert_eq!(page.previous.as_deref(), Some("http://example.org/books?page=1"));
    }

    #[test]
    fn cover_prefers_jpeg_over_later_image_entries() {
        let book = book_with_formats(json!({
            "image/png": "png-url",
            "image/jpeg": "jpeg-url",
            "text/html": "html-url"
        }));
        assert_eq!(book.cover_url(), Some("jpeg-url"));
    }

    #[test]
    fn open_target_is_first_entry_in_document_order() {
        let book = book_with_formats(json!({
            "image/jpeg": "jpeg-url",
            "text/html": "html-url"
        }));
        assert_eq!(book.open_target(), Some("jpeg-url"));
        assert_eq!(book.cover_url(), Some("jpeg-url"));

        let reversed = book_with_formats(json!({
            "text/html": "html-url",
            "image/jpeg": "jpeg-url"
        }));
        assert_eq!(reversed.open_target(), Some("html-url"));
        assert_eq!(reversed.cover_url(), Some("jpeg-url"));
    }

    #[test]
    fn viewable_prefers_html_over_pdf_and_plain_text() {
        let book = book_with_formats(json!({
            "text/plain; charset=utf-8": "txt-url",
            "application/pdf": "pdf-url",
            "text/html; charset=iso-8859-1": "html-url"
        }));
        assert_eq!(book.viewable_url(), Some("html-url"));
    }

    #[test]
    fn archives_are_not_viewable() {
        let book = book_with_formats(json!({
            "application/zip": "zip-url",
            "application/x-zip-compressed": "zip2-url"
        }));
        assert_eq!(book.viewable_url(), None);
        assert_eq!(book.open_target(), Some("zip-url"));
    }

    #[test_case("text/html", true)]
    #[test_case("TEXT/HTML; charset=utf-8", true)]
    #[test_case("application/pdf", true)]
    #[test_case("text/plain; charset=us-ascii", true)]
    #[test_case("application/zip", false)]
    #[test_case("image/jpeg", false)]
    #[test_case("application/epub+zip", false)]
    fn viewable_mime_detection(mime: &str, expected: bool) {
        let mut formats = Map::new();
        formats.insert(mime.to_string(), Value::from("url"));
        let book = Book { formats, ..Book::default() };
        assert_eq!(book.viewable_url().is_some(), expected);
    }

    #[test]
    fn author_line_joins_names() {
        let mut book = Book::default();
        assert_eq!(book.author_line(), "unknown");

        book.authors = vec![
            Person { name: "Twain, Mark".to_string(), ..Person::default() },
            Person { name: "Verne, Jules".to_string(), ..Person::default() },
        ];
        assert_eq!(book.author_line(), "Twain, Mark, Verne, Jules");
    }
}
