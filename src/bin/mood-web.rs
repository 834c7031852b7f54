//! mood-web: mood journal served as a local web page.

#[tokio::main]
async fn main() {
    if let Err(e) = mood_journal::web_client::run().await {
        mood_journal::tlog!("mood-web: {}", e);
        std::process::exit(1);
    }
}
