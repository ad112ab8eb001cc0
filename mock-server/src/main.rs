use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "5001".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("listening on {addr}");
    match std::env::var("WUKONGIM_TOKEN") {
        Ok(token) if !token.is_empty() => mock_server::run_with_token(listener, &token).await,
        _ => mock_server::run(listener).await,
    }
}
