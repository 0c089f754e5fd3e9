use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

// Use library instead of local modules
use event_checkin::{
    format_brl, format_cpf, is_valid_cpf, logging, mask_cpf, normalize_cpf, parse_amount,
    PaymentConfig, PaymentFeeCalculator, PaymentMethod,
};

#[derive(Parser)]
#[command(name = "event-checkin", version, about = "CPF and payment option checks for event registration")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a CPF (formatted or not)
    Cpf { value: String },

    /// List the payment options for a price
    Options {
        price: String,

        /// JSON payment configuration; defaults when omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check whether a method/installment combination is accepted
    Check {
        method: String,

        #[arg(long)]
        installments: Option<u32>,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    logging::init("warn");

    let cli = Cli::parse();

    match cli.command {
        Command::Cpf { value } => run_cpf(&value),
        Command::Options { price, config } => run_options(&price, config),
        Command::Check {
            method,
            installments,
            config,
        } => run_check(&method, installments, config),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<PaymentConfig> {
    let Some(path) = path else {
        return Ok(PaymentConfig::default());
    };

    let config = PaymentConfig::from_file(&path)?;
    if let Err(errors) = config.validate() {
        for e in &errors {
            eprintln!("⚠️  {}", e);
        }
        return Err(anyhow!("{} problem(s) in {:?}", errors.len(), path));
    }

    Ok(config)
}

fn run_cpf(value: &str) -> Result<()> {
    let result = is_valid_cpf(value);

    match result.error {
        None => {
            println!("✓ CPF válido: {}", format_cpf(value).unwrap_or_default());
            println!("   Armazenado como: {}", normalize_cpf(value));
            println!("   Exibição: {}", mask_cpf(value).unwrap_or_default());
            Ok(())
        }
        Some(error) => Err(anyhow!("❌ {}", error)),
    }
}

fn run_options(price: &str, config: Option<PathBuf>) -> Result<()> {
    let price = parse_amount(price)?;
    let calculator = PaymentFeeCalculator::new(load_config(config)?);
    let options = calculator.calculate(price);

    if options.is_empty() {
        return Err(anyhow!("No payment options for {}", format_brl(price)));
    }

    println!("💳 Opções de pagamento para {}", format_brl(price));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for option in &options.available_methods {
        println!("  {:<12} {:<28} total {}", option.method, option.description, format_brl(option.final_value));
    }

    Ok(())
}

fn run_check(method: &str, installments: Option<u32>, config: Option<PathBuf>) -> Result<()> {
    let method: PaymentMethod = method.parse()?;
    let calculator = PaymentFeeCalculator::new(load_config(config)?);

    if calculator.validate(method, installments) {
        println!("✓ {} em {}x aceito", method.label(), installments.unwrap_or(1));
        Ok(())
    } else {
        Err(anyhow!("❌ {} em {}x indisponível", method.label(), installments.unwrap_or(1)))
    }
}
