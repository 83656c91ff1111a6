use async_trait::async_trait;
use inquire::Confirm;
use weatherpro_core::PermissionPrompt;

/// Asks on the terminal before the public IP address is sent to the geolocation service.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

#[async_trait]
impl PermissionPrompt for TerminalPrompt {
    async fn ask(&self) -> bool {
        let answer = tokio::task::spawn_blocking(|| {
            Confirm::new("Share your approximate location (looked up from your IP address)?")
                .with_default(false)
                .with_help_message("Pass --lat/--lon or set [location] in the config to skip this")
                .prompt()
        })
        .await;

        match answer {
            Ok(Ok(granted)) => granted,
            Ok(Err(err)) => {
                tracing::warn!(%err, "location prompt unavailable, treating as denied");
                false
            }
            Err(err) => {
                tracing::warn!(%err, "location prompt task failed, treating as denied");
                false
            }
        }
    }
}
