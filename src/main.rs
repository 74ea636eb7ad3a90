use std::process::ExitCode;

mod actions;
mod app;
mod config;
mod dom;
mod elements;
mod events;
mod extractor;
mod host;
mod html;
mod playback;
mod preferences;
mod rating;
mod session;
#[cfg(test)]
mod test_utils;
mod time;
mod utils;
mod webapp;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let result = app::start().await;
    match result {
        Ok(..) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:?}");
            ExitCode::FAILURE
        }
    }
}
