use clap::Args;
use hearth::payments::{sign_payment, verify_payment_signature};
use hearth_app::config::AppConfig;
use tracing::warn;

#[derive(Debug, Args)]
pub(crate) struct SignArgs {
    /// Gateway order id
    #[arg(long)]
    order_id: String,

    /// Gateway payment id
    #[arg(long)]
    payment_id: String,
}

#[derive(Debug, Args)]
pub(crate) struct VerifyArgs {
    /// Gateway order id
    #[arg(long)]
    order_id: String,

    /// Gateway payment id
    #[arg(long)]
    payment_id: String,

    /// Hex signature to check
    #[arg(long)]
    signature: String,
}

pub(crate) fn sign(config: &AppConfig, args: &SignArgs) -> Result<(), String> {
    let secret = config
        .payment_secret()
        .map_err(|error| format!("invalid payment secret: {error}"))?
        .ok_or_else(|| "PAYMENT_KEY_SECRET is not set".to_string())?;

    let signature = sign_payment(&args.order_id, &args.payment_id, &secret)
        .map_err(|error| format!("failed to sign payment: {error}"))?;

    super::print_line(&signature)
}

pub(crate) fn verify(config: &AppConfig, args: &VerifyArgs) -> Result<(), String> {
    let secret = config
        .payment_secret()
        .map_err(|error| format!("invalid payment secret: {error}"))?;

    let valid = verify_payment_signature(
        &args.order_id,
        &args.payment_id,
        &args.signature,
        secret.as_ref(),
    )
    .map_err(|error| format!("failed to verify payment: {error}"))?;

    if !valid {
        warn!(order_id = %args.order_id, payment_id = %args.payment_id, "invalid signature");

        return Err("signature is invalid".to_string());
    }

    super::print_line("signature is valid")
}
