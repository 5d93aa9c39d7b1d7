//! CLI command implementations.

use crate::AppContext;
use kestrel_types::address::to_integrated_address;
use kestrel_types::amount::{format_amount_with_ticker, parse_amount};
use kestrel_types::base58::keccak256;
use kestrel_types::PaymentId;
use kestrel_wallet::{
    relay, AddressCodec, BuiltTransaction, DaemonLedger, DecoyResolver, LedgerService,
    NetworkCodec, OwnedInput,
};

type Result = std::result::Result<(), Box<dyn std::error::Error>>;

async fn connect(ctx: &AppContext) -> std::result::Result<DaemonLedger, Box<dyn std::error::Error>> {
    println!("Connecting to {} ...", ctx.daemon_url);
    let ledger = DaemonLedger::new(&ctx.daemon_url)?;
    ledger.refresh().await?;
    Ok(ledger)
}

pub async fn show_status(ctx: &AppContext) -> Result {
    let ledger = connect(ctx).await?;
    let status = ledger.status();
    let limit = ctx.config.mixin_limits.for_height(status.height);

    println!("Daemon status:");
    println!("  Height:           {} / {}", status.height, status.network_height);
    if status.node_fee.amount > 0 {
        println!(
            "  Node fee:         {} to {}",
            format_amount_with_ticker(status.node_fee.amount),
            status.node_fee.address
        );
    } else {
        println!("  Node fee:         none");
    }
    println!("  Mixin range:      {}..={} (default {})", limit.min, limit.max, limit.default);
    println!("  Minimum fee:      {}", format_amount_with_ticker(ctx.config.minimum_fee));

    Ok(())
}

pub fn decode_address(ctx: &AppContext, address: &str) -> Result {
    let parsed = NetworkCodec::new(ctx.network).decode(address)?;

    println!("Network:          {:?}", parsed.network);
    println!("Type:             {:?}", parsed.address_type);
    println!("Spend public key: {}", hex::encode(parsed.spend_public_key));
    println!("View public key:  {}", hex::encode(parsed.view_public_key));
    if let Some(pid) = parsed.payment_id {
        println!("Payment ID:       {}", pid);
        println!("Standard address: {}", parsed.standard_address());
    }
    Ok(())
}

pub fn integrate_address(ctx: &AppContext, address: &str, payment_id: &str) -> Result {
    NetworkCodec::new(ctx.network).decode(address)?;
    let pid: PaymentId = payment_id.parse()?;
    println!("{}", to_integrated_address(address, &pid)?);
    Ok(())
}

/// Stand-in input for an amount; only the amount matters for decoy requests.
fn probe_input(amount: u64) -> OwnedInput {
    OwnedInput {
        tx_public_key: [0; 32],
        output_index: 0,
        global_index: u64::MAX,
        amount,
        public_spend_key: [0; 32],
        private_spend_key: [0; 32],
    }
}

pub async fn probe_decoys(ctx: &AppContext, amounts: &[String], mixin: Option<u64>) -> Result {
    let inputs = amounts
        .iter()
        .map(|a| parse_amount(a).map(probe_input))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let ledger = connect(ctx).await?;
    let mixin = mixin.unwrap_or_else(|| ctx.config.mixin_limits.default_mixin(ledger.current_height()));

    let rings = DecoyResolver::new(&ledger, ctx.config.decoy_policy, ctx.config.network_timeout)
        .resolve(&inputs, mixin)
        .await?;

    for (input, ring) in inputs.iter().zip(&rings) {
        println!("{} ({} decoys):", format_amount_with_ticker(input.amount), ring.len());
        for member in ring {
            println!("  #{:<10} {}", member.global_index, hex::encode(member.key));
        }
    }
    Ok(())
}

pub async fn relay_raw(ctx: &AppContext, raw_hex: &str) -> Result {
    let raw = hex::decode(raw_hex.trim())?;
    if raw.len() > ctx.config.max_transaction_size {
        return Err(format!(
            "transaction is {} bytes, limit is {}",
            raw.len(),
            ctx.config.max_transaction_size
        )
        .into());
    }
    let built = BuiltTransaction {
        hash: keccak256(&raw),
        raw,
    };

    let ledger = DaemonLedger::new(&ctx.daemon_url)?;
    let hash = relay::relay(&ledger, &built, ctx.config.network_timeout).await?;
    println!("Relayed transaction {}", hash);
    Ok(())
}
