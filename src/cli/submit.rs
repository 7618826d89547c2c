use anyhow::Result;
use consultoria_client::{FormController, SubmissionClient, SubmitOutcome};
use consultoria_contact::ContactSubmission;

#[derive(Debug, clap::Args)]
pub struct SubmitArgs {
    #[arg(long)]
    pub nombre: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub telefono: String,

    #[arg(long, default_value = "")]
    pub servicio: String,

    #[arg(long)]
    pub comentario: String,

    /// Intake endpoint (overrides config file)
    #[arg(long)]
    pub endpoint: Option<String>,
}

/// Validate and post one submission, the way the contact form does.
pub async fn submit(config: crate::config::Config, args: SubmitArgs) -> Result<()> {
    let endpoint = args.endpoint.unwrap_or(config.client.endpoint);
    let controller = FormController::new(SubmissionClient::with_endpoint(endpoint));
    controller.state().set_values(ContactSubmission {
        nombre: args.nombre,
        email: args.email,
        telefono: args.telefono,
        servicio: args.servicio,
        comentario: args.comentario,
    });

    match controller.handle_submit().await? {
        SubmitOutcome::Sent(ack) => {
            println!("{}", ack.message);
            Ok(())
        }
        SubmitOutcome::Invalid(errors) => {
            anyhow::bail!("{} invalid field(s):\n{errors}", errors.len())
        }
        SubmitOutcome::AlreadySubmitting => anyhow::bail!("a submission is already in progress"),
    }
}
