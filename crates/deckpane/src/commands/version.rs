use colored::Colorize;

pub fn run() {
    println!(
        "{} {}",
        "deckpane".bold(),
        env!("CARGO_PKG_VERSION").dimmed()
    );
    println!("Live slide-deck preview for Markdown documents");
}
