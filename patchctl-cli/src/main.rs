//! patchctl: reconcile desired patch configurations and service-desk
//! tickets against ManageEngine backends.
//!
//! The binary is thin glue: it validates arguments, runs one
//! reconciliation, prints the `{changed, failed, msg}` outcome as JSON, and
//! exits non-zero when the outcome is a failure. All decision logic lives in
//! the `patchctl` library.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use patchctl::desired::{DesiredState, PatchConfigSpec, TicketSpec};
use patchctl::reconciler::ticket::DEFAULT_REQUESTER_USERNAME;
use patchctl::{
    Endpoint, EndpointCentralTransport, Outcome, PatchConfigReconciler, Reconcile,
    ServiceDeskTransport, TicketReconciler,
};

/// Reconcile patch deployments and their service-desk tickets.
#[derive(Parser, Debug)]
#[command(name = "patchctl", version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ensure a patch configuration exists on the patch-management backend.
    PatchConfig {
        /// Backend host, scheme optional (defaults to https)
        #[arg(long)]
        url: String,

        /// Backend port
        #[arg(long)]
        port: u16,

        /// API auth key
        #[arg(long)]
        api_key: String,

        /// Name of the patch configuration
        #[arg(long, default_value = "Automated patch configuration")]
        name: String,

        /// Description of the patch configuration
        #[arg(long, default_value = "Install select patches to devices")]
        description: String,

        /// Deployment policy name, resolved to a template id
        #[arg(long)]
        deployment_policy: String,

        /// Host resource name; repeat for multiple hosts
        #[arg(long = "host", required = true)]
        hosts: Vec<String>,

        /// Patch-type label; repeat for multiple types
        #[arg(long = "patch-type", required = true)]
        patch_types: Vec<String>,

        /// Desired state (the backend offers no removal call)
        #[arg(long, value_parser = ["present"], default_value = "present")]
        state: String,
    },

    /// Ensure a request ticket exists (or not) on the service-desk backend.
    Ticket {
        /// Backend host, scheme optional (defaults to https)
        #[arg(long)]
        url: String,

        /// Backend port
        #[arg(long)]
        port: u16,

        /// API auth key
        #[arg(long)]
        api_key: String,

        /// Ticket subject
        #[arg(long, default_value = "Request created by patchctl")]
        name: String,

        /// Deployment policy cited in the generated description
        #[arg(long)]
        deployment_policy: Option<String>,

        /// Host resource name; repeat for multiple hosts
        #[arg(long = "host", required = true)]
        hosts: Vec<String>,

        /// Patch-type label; repeat for multiple types
        #[arg(long = "patch-type")]
        patch_types: Vec<String>,

        /// Account resolved as the ticket requester
        #[arg(long, default_value = DEFAULT_REQUESTER_USERNAME)]
        requester: String,

        /// Desired state
        #[arg(long, value_parser = ["present", "absent"])]
        state: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "patchctl=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let outcome = run(args.command).await;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if outcome.failed {
        std::process::exit(1);
    }
    Ok(())
}

async fn run(command: Command) -> Outcome {
    let result = match command {
        Command::PatchConfig {
            url,
            port,
            api_key,
            name,
            description,
            deployment_policy,
            hosts,
            patch_types,
            state: _,
        } => {
            info!("Reconciling patch config against {}", url);
            let transport =
                Arc::new(EndpointCentralTransport::new(Endpoint::new(&url, port, api_key)));
            let spec = PatchConfigSpec {
                name,
                description,
                policy_name: deployment_policy,
                hosts,
                patch_types,
            };
            PatchConfigReconciler::new(transport).reconcile(&spec).await
        }
        Command::Ticket {
            url,
            port,
            api_key,
            name,
            deployment_policy,
            hosts,
            patch_types,
            requester,
            state,
        } => {
            info!("Reconciling ticket against {}", url);
            let transport =
                Arc::new(ServiceDeskTransport::new(Endpoint::new(&url, port, api_key)));
            let spec = TicketSpec {
                name,
                policy_name: deployment_policy,
                hosts,
                patch_types,
                state: if state == "absent" {
                    DesiredState::Absent
                } else {
                    DesiredState::Present
                },
            };
            TicketReconciler::new(transport)
                .with_requester(requester)
                .reconcile(&spec)
                .await
        }
    };

    result.unwrap_or_else(|e| {
        error!("Reconciliation failed: {}", e);
        Outcome::failed(format!("failed to reconcile: {e}"))
    })
}
