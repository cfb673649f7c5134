use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::io::Write;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

mod api;
mod browse;
mod data;
mod debounce;
mod pager;

use crate::api::CatalogClient;
use crate::browse::BrowseSession;
use crate::data::Book;
use crate::debounce::Debouncer;
use crate::pager::{step, PagerAction, PagerState};

/// Quantized delay between typing search text and firing the request.
const SEARCH_DEBOUNCE: Duration = Duration::from_millis(350);

#[derive(Parser, Debug)]
#[clap(about = "Browse a public book catalog by category, with incremental loading.")]
pub struct BookdexArgs {
    /// Category to browse.
    #[clap(value_parser = validate_topic, default_value = "Fiction")]
    pub topic: String,

    /// Initial search text, matched upstream against titles and authors.
    #[clap(long)]
    pub search: Option<String>,
}

fn validate_topic(value: &str) -> Result<String, String> {
    canonical_topic(value)
        .map(String::from)
        .ok_or_else(|| format!("expected one of: {}", data::CATEGORIES.join(", ")))
}

/// Case-insensitive lookup into the category list.
fn canonical_topic(value: &str) -> Option<&'static str> {
    let value = value.trim();
    data::CATEGORIES
        .iter()
        .copied()
        .find(|category| category.eq_ignore_ascii_case(value))
}

/// One line of user input, already trimmed. Anything that is not a
/// recognized command is search text.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Next,
    Prev,
    Open(usize),
    Topic(String),
    Search(String),
    Help,
    Quit,
    Unknown,
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    match line {
        "" | "n" | "next" => return Command::Next,
        "p" | "prev" => return Command::Prev,
        "h" | "help" | "?" => return Command::Help,
        "q" | "quit" | "exit" => return Command::Quit,
        _ => {}
    }
    if let Some(rest) = line.strip_prefix("o ").or_else(|| line.strip_prefix("open ")) {
        return match rest.trim().parse::<usize>() {
            Ok(number) if number >= 1 => Command::Open(number),
            _ => Command::Unknown,
        };
    }
    if let Some(rest) = line.strip_prefix("/topic") {
        return Command::Topic(rest.trim().to_string());
    }
    if let Some(rest) = line.strip_prefix("/search") {
        return Command::Search(rest.trim_start().to_string());
    }
    if line.starts_with('/') {
        return Command::Unknown;
    }
    Command::Search(line.to_string())
}

fn print_help() {
    println!("enter/n  next window of results (fetches more near the end)");
    println!("p        previous window");
    println!("o <n>    open book number <n> in the browser");
    println!("/topic <name>   switch category ({})", data::CATEGORIES.join(", "));
    println!("/search <text>  filter by title/author; empty text clears the filter");
    println!("<text>   same as /search <text>");
    println!("q        quit");
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

/// Re-derive items-per-window from the terminal height.
fn apply_viewport(pager: PagerState) -> PagerState {
    match crossterm::terminal::size() {
        Ok((_, rows)) => {
            let per_view = pager::per_view_for_rows(rows);
            if per_view != pager.per_view {
                step(pager, PagerAction::Resize(per_view))
            } else {
                pager
            }
        }
        Err(_) => pager,
    }
}

fn render(session: &BrowseSession<CatalogClient>, pager: &PagerState) {
    println!();
    if let Some(error) = session.error() {
        println!("error: {error}");
    }
    if session.books().is_empty() {
        if session.error().is_none() {
            println!("No books found in {}.", session.topic());
        }
        return;
    }
    let range = pager.visible_range();
    for (offset, book) in session.books()[range.clone()].iter().enumerate() {
        let number = range.start + offset + 1;
        let cover = if book.cover_url().is_some() { "" } else { "  [no cover]" };
        println!("{number:>4}. {}{cover}", book.title);
        println!("      {} | {} downloads", book.author_line(), book.download_count);
    }
    let more = if session.has_more() { ", more available" } else { "" };
    println!(
        "[{}] window {}/{} | {} loaded{}",
        session.topic(),
        pager.index + 1,
        pager.windows().max(1),
        session.books().len(),
        more
    );
}

/// Open the book's primary resource: the first entry of its format map.
/// Books without any inline-viewable format get a notice instead.
fn open_book(book: &Book) {
    if book.viewable_url().is_none() {
        println!(
            "\"{}\" has no format a browser can display; not opening.",
            book.title
        );
        return;
    }
    match book.open_target() {
        Some(url) => println!("Open in browser: {url}"),
        None => println!("\"{}\" has no download URL.", book.title),
    }
}

/// Fetch the next page when the user is standing on the last window.
async fn top_up(session: &mut BrowseSession<CatalogClient>, pager: PagerState) -> PagerState {
    if pager.on_last_window() && session.may_load_more() {
        session.load_more().await;
        return step(pager, PagerAction::SetTotal(session.books().len()));
    }
    pager
}

async fn start_over(session: &mut BrowseSession<CatalogClient>, pager: PagerState) -> PagerState {
    session.refresh().await;
    let pager = step(pager, PagerAction::Reset);
    step(pager, PagerAction::SetTotal(session.books().len()))
}

#[tokio::main]
async fn main() {
    let args = BookdexArgs::parse();
    SimpleLogger::new().with_level(LevelFilter::Warn).init().ok();

    let mut session = BrowseSession::new(CatalogClient::new(), args.topic);
    if let Some(search) = args.search {
        session.set_search(search);
    }

    let per_view = crossterm::terminal::size()
        .map(|(_, rows)| pager::per_view_for_rows(rows))
        .unwrap_or(5);
    let mut pager = PagerState::new(per_view);

    println!("bookdex | h for help");
    pager = start_over(&mut session, pager).await;
    render(&session, &pager);

    let (tx, mut rx) = mpsc::channel(4);
    let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE, tx);
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt();
        tokio::select! {
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { break };
                match parse_command(&line) {
                    Command::Quit => break,
                    Command::Help => print_help(),
                    Command::Next => {
                        pager = apply_viewport(pager);
                        pager = step(pager, PagerAction::Next);
                        pager = top_up(&mut session, pager).await;
                        render(&session, &pager);
                    }
                    Command::Prev => {
                        pager = apply_viewport(pager);
                        pager = step(pager, PagerAction::Prev);
                        render(&session, &pager);
                    }
                    Command::Open(number) => match session.books().get(number - 1) {
                        Some(book) => open_book(book),
                        None => println!("no book numbered {number}"),
                    },
                    Command::Topic(topic) => match canonical_topic(&topic) {
                        Some(topic) => {
                            session.set_topic(topic);
                            pager = start_over(&mut session, pager).await;
                            render(&session, &pager);
                        }
                        None => println!(
                            "unknown category; expected one of: {}",
                            data::CATEGORIES.join(", ")
                        ),
                    },
                    Command::Search(text) => debouncer.schedule(text),
                    Command::Unknown => println!("unrecognized command; h for help"),
                }
            }
            Some(search) = rx.recv() => {
                session.set_search(search);
                pager = start_over(&mut session, pager).await;
                render(&session, &pager);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    debouncer.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("", Command::Next ; "empty line pages forward")]
    #[test_case("n", Command::Next)]
    #[test_case(" next ", Command::Next)]
    #[test_case("p", Command::Prev)]
    #[test_case("q", Command::Quit)]
    #[test_case("?", Command::Help)]
    #[test_case("o 3", Command::Open(3))]
    #[test_case("open 12", Command::Open(12))]
    #[test_case("o zero", Command::Unknown)]
    #[test_case("o 0", Command::Unknown)]
    #[test_case("/topic Drama", Command::Topic("Drama".to_string()))]
    #[test_case("/search Twain", Command::Search("Twain".to_string()))]
    #[test_case("/search", Command::Search(String::new()) ; "bare search clears the filter")]
    #[test_case("/bogus", Command::Unknown)]
    #[test_case("Twain", Command::Search("Twain".to_string()) ; "plain text is search input")]
    fn command_parsing(line: &str, expected: Command) {
        assert_eq!(parse_command(line), expected);
    }

    #[test_case("Fiction", Some("Fiction") ; "exact case matches")]
    #[test_case("fiction", Some("Fiction") ; "lowercase matches")]
    #[test_case(" HISTORY ", Some("History"))]
    #[test_case("Cooking", None)]
    fn topic_lookup(value: &str, expected: Option<&str>) {
        assert_eq!(canonical_topic(value), expected);
    }

    #[test]
    fn topic_argument_validation() {
        assert_eq!(validate_topic("drama"), Ok("Drama".to_string()));
        assert!(validate_topic("Cooking").is_err());
    }
}
