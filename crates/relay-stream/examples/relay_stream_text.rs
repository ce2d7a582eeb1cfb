use std::sync::Arc;

use relay_stream::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), RelayError> {
    let relay = Relay::new(Arc::new(HttpUpstream::from_env()?), SessionRegistry::new());

    let mut stream = relay.start("example", "Describe the Huarong Trail puzzle in 20 words.");
    while let Some(event) = stream.next_event().await {
        match event {
            RelayEvent::Think { delta } => eprint!("{delta}"),
            RelayEvent::Text { delta } => print!("{delta}"),
            RelayEvent::End { .. } => println!(),
            RelayEvent::Cancelled => eprintln!("cancelled"),
            RelayEvent::Error { message } => eprintln!("relay error: {message}"),
            RelayEvent::Image { url } => eprintln!("image: {url}"),
        }
    }
    Ok(())
}
