use anyhow::Result;
use retriever_index::CodeIndex;
use retriever_llm::LlmClient;
use retriever_model::CodeFragment;
use retriever_search::RetrievalStrategy;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Fragments handed to the LLM as context for one question.
const ASK_CONTEXT_SIZE: usize = 5;

const LIST_LIMIT: usize = 50;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Search(String),
    Ask(String),
    Show(String),
    List,
    Stats,
    Quit,
    Empty,
    Unknown,
}

fn parse_command(input: &str) -> Command {
    let input = input.trim();
    if input.is_empty() {
        return Command::Empty;
    }
    if input.eq_ignore_ascii_case("quit") {
        return Command::Quit;
    }
    if input == "list" {
        return Command::List;
    }
    if input == "stats" {
        return Command::Stats;
    }
    if let Some(query) = input.strip_prefix("search ") {
        return Command::Search(query.trim().to_string());
    }
    if let Some(question) = input.strip_prefix("ask ") {
        return Command::Ask(question.trim().to_string());
    }
    if let Some(number) = input.strip_prefix("show ") {
        return Command::Show(number.trim().to_string());
    }
    Command::Unknown
}

/// Interactive read-eval loop over a built index.
pub struct Shell<'a> {
    index: &'a CodeIndex,
    strategy: Box<dyn RetrievalStrategy>,
    client: Arc<dyn LlmClient>,
    max_results: usize,
    last_results: Vec<CodeFragment>,
}

impl<'a> Shell<'a> {
    pub fn new(
        index: &'a CodeIndex,
        strategy: Box<dyn RetrievalStrategy>,
        client: Arc<dyn LlmClient>,
        max_results: usize,
    ) -> Self {
        Self {
            index,
            strategy,
            client,
            max_results,
            last_results: Vec::new(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        println!("Available commands:");
        println!(
            "  search <query>    - Find relevant code (strategy: {})",
            self.strategy.name()
        );
        println!("  ask <question>    - Ask the LLM about the code (RAG)");
        println!("  show <number>     - Show details of a result from the last search");
        println!("  list              - List the first {LIST_LIMIT} code fragments");
        println!("  stats             - Show project statistics");
        println!("  quit              - Exit\n");

        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            print!("> ");
            io::stdout().flush()?;

            let Some(line) = lines.next() else {
                break;
            };

            match parse_command(&line?) {
                Command::Quit => break,
                Command::Empty => {}
                Command::Search(query) if query.is_empty() => {
                    println!("Enter a search query.");
                }
                Command::Search(query) => self.search(&query),
                Command::Ask(question) if question.is_empty() => {
                    println!("Enter a question for the LLM.");
                }
                Command::Ask(question) => self.ask(&question),
                Command::Show(number) => match number.parse::<usize>() {
                    Ok(position) => self.show(position),
                    Err(_) => println!("Invalid number format. Use 'show <number>'."),
                },
                Command::List => self.list(),
                Command::Stats => crate::print_statistics(self.index),
                Command::Unknown => {
                    println!("Unknown command. Available: search, ask, show, list, stats, quit");
                }
            }
        }
        Ok(())
    }

    fn search(&mut self, query: &str) {
        println!(
            "\nSearching (strategy: {}) for: \"{query}\"",
            self.strategy.name()
        );
        log::info!("Executing search with query: {query}");

        let results = self.strategy.retrieve(query, self.index, self.max_results);
        self.last_results = results.iter().map(|f| (*f).clone()).collect();

        if self.last_results.is_empty() {
            println!("No results.");
            return;
        }

        println!("Found {} relevant results:\n", self.last_results.len());
        for (i, fragment) in self.last_results.iter().enumerate() {
            println!(
                "[{i}] {fragment} - {}:{}",
                fragment.file_path, fragment.start_line
            );
        }
        println!("\nUse 'show <number>' to display details");
    }

    fn ask(&mut self, question: &str) {
        if !self.client.is_available() {
            println!("Error: LLM client is not configured. Set an API key for the provider.");
            return;
        }

        println!("\nThinking... (question: {question})");
        println!("1. Retrieving context from the code...");
        log::info!("RAG: retrieving context for query: {question}");

        let context: Vec<CodeFragment> = self
            .strategy
            .retrieve(question, self.index, ASK_CONTEXT_SIZE)
            .into_iter()
            .cloned()
            .collect();

        if context.is_empty() {
            println!("Warning: no relevant context found in the code. Asking without it...");
            log::warn!("RAG: no context found for query");
        } else {
            println!("✓ Found {} relevant fragments for context.", context.len());
            for fragment in &context {
                log::debug!("RAG: context fragment: {}", fragment.id);
            }
        }

        println!("2. Sending question and context to {}...", self.client.provider_name());
        match self.client.query_with_context(question, &context) {
            Ok(answer) => {
                println!("\n=== Assistant Answer ===\n");
                println!("{answer}");
                println!("\n========================\n");
            }
            Err(err) => {
                log::error!("Error during LLM query execution: {err}");
                println!("\nError talking to the LLM service: {err}");
            }
        }
    }

    fn show(&self, position: usize) {
        if self.last_results.is_empty() {
            println!("Run a 'search' command first.");
            return;
        }
        let Some(fragment) = self.last_results.get(position) else {
            println!(
                "Invalid index. It must be between 0 and {}",
                self.last_results.len() - 1
            );
            return;
        };

        println!("\n{}", "=".repeat(80));
        println!("Fragment: {} ({})", fragment.name, fragment.id);
        println!("Kind: {}", fragment.kind);
        println!("File: {}", fragment.file_path);
        println!("Lines: {}-{}", fragment.start_line, fragment.end_line);
        println!(
            "Package: {}",
            fragment.package_name.as_deref().unwrap_or("n/a")
        );

        if let Some(documentation) = fragment.documentation.as_deref().filter(|d| !d.is_empty()) {
            println!("\n--- Documentation ---");
            println!("{documentation}");
        }
        if let Some(signature) = fragment.signature.as_deref().filter(|s| !s.is_empty()) {
            println!("\n--- Signature ---");
            println!("{signature}");
        }
        if !fragment.dependencies.is_empty() {
            println!("\n--- Dependencies ---");
            println!("{}", fragment.dependencies.join(", "));
        }

        println!("\n{} Content {}", "-".repeat(35), "-".repeat(36));
        println!("{}", fragment.content.as_deref().unwrap_or(""));
        println!("{}\n", "=".repeat(80));
    }

    fn list(&self) {
        println!("\nAll code fragments (first {LIST_LIMIT}):");
        let fragments = self.index.fragments();

        if fragments.is_empty() {
            println!("Nothing to display.");
            return;
        }

        for (i, fragment) in fragments.iter().take(LIST_LIMIT).enumerate() {
            println!("[{i}] {fragment}");
        }
        if fragments.len() > LIST_LIMIT {
            println!("... and {} more", fragments.len() - LIST_LIMIT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn commands_parse_with_arguments() {
        assert_eq!(
            parse_command("search user repository"),
            Command::Search("user repository".to_string())
        );
        assert_eq!(
            parse_command("ask how does caching work"),
            Command::Ask("how does caching work".to_string())
        );
        assert_eq!(parse_command("show 3"), Command::Show("3".to_string()));
    }

    #[test]
    fn bare_commands_parse() {
        assert_eq!(parse_command("list"), Command::List);
        assert_eq!(parse_command("stats"), Command::Stats);
        assert_eq!(parse_command("quit"), Command::Quit);
        assert_eq!(parse_command("QUIT"), Command::Quit);
        assert_eq!(parse_command("   "), Command::Empty);
    }

    #[test]
    fn missing_arguments_become_empty_payloads() {
        assert_eq!(parse_command("search "), Command::Search(String::new()));
        assert_eq!(parse_command("ask "), Command::Ask(String::new()));
    }

    #[test]
    fn unknown_input_is_flagged() {
        assert_eq!(parse_command("frobnicate"), Command::Unknown);
        // Bare "search" without a trailing space is not a search.
        assert_eq!(parse_command("search"), Command::Unknown);
    }
}
