use anyhow::{Context, Result, bail};
use harness_lib::types::{MAX_SPINS_PER_CALL, SpinMode};
use harness_lib::units::{TGAS, parse_near_amount};
use std::{env, str::FromStr};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FundingMode {
    /// The testnet helper endpoint creates and funds the account.
    Faucet,
    /// The caller account creates the account and transfers `funding_amount`.
    Payer,
}

#[derive(Clone, Debug)]
pub enum CredentialSource {
    SeedPhrase(String),
    File(String),
}

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub near_rpc_url: String,
    pub rpc_timeout_ms: u64,

    pub account_id: String,
    pub credential: CredentialSource,
    pub contract_id: Option<String>,
    pub deploy_contract: bool,
    pub contract_wasm_path: String,

    pub faucet_url: String,
    pub funding_mode: FundingMode,
    pub funding_amount: u128,
    pub account_suffix: String,
    pub sink_account_id: String,
    pub settle_delay_ms: u64,
    pub rotation_wait_min_secs: u64,
    pub rotation_wait_max_secs: u64,

    pub spin_method: String,
    pub spin_mode: SpinMode,
    pub spins_per_call: usize,
    pub bet_amount: u128,
    pub callback_gas: u8,
    pub call_gas: u64,
    pub max_rounds: Option<u64>,
    pub round_delay_ms: u64,
    pub stats_every: u64,
    pub verbose: bool,

    pub ft_contract_id: Option<String>,
    pub ft_deposit_amount: Option<String>,

    pub log_level: String,
    pub log_format: String,
    pub log_color: bool,
}

impl RuntimeConfig {
    pub fn contract_id(&self) -> Result<&str> {
        self.contract_id
            .as_deref()
            .context("NEAR_CONTRACT_ID must be set")
    }
}

pub fn load() -> Result<RuntimeConfig> {
    let _ = dotenvy::dotenv();

    let near_rpc_url = env_str("NEAR_RPC_URL", Some("https://test.rpc.fastnear.com".into()))
        .context("NEAR_RPC_URL must be set")?;
    let rpc_timeout_ms =
        env_u64("RPC_TIMEOUT_MS", Some(30_000)).context("RPC_TIMEOUT_MS must be a number")?;

    let account_id = env_str("NEAR_ACCOUNT_ID", None).context("NEAR_ACCOUNT_ID must be set")?;
    let credential = match (
        env_str("NEAR_SEED_PHRASE", None),
        env_str("NEAR_CREDENTIALS_PATH", None),
    ) {
        (Some(phrase), _) => CredentialSource::SeedPhrase(phrase),
        (None, Some(path)) => CredentialSource::File(path),
        (None, None) => bail!("NEAR_SEED_PHRASE or NEAR_CREDENTIALS_PATH must be set"),
    };
    let contract_id = env_str("NEAR_CONTRACT_ID", None);
    let deploy_contract = env_bool("DEPLOY_CONTRACT", Some(false))
        .context("DEPLOY_CONTRACT must be true or false")?;
    let contract_wasm_path = env_str(
        "CONTRACT_WASM_PATH",
        Some("./contract/target/near/contract_rs.wasm".into()),
    )
    .context("CONTRACT_WASM_PATH must be set")?;

    let faucet_url = env_str(
        "FAUCET_URL",
        Some("https://helper.nearprotocol.com/account".into()),
    )
    .context("FAUCET_URL must be set")?;
    let funding_mode = env_funding_mode("FUNDING_MODE", Some(FundingMode::Faucet))
        .context("FUNDING_MODE must be faucet or payer")?;
    let funding_amount =
        env_near("FUNDING_AMOUNT", Some("10")).context("FUNDING_AMOUNT must be a NEAR amount")?;
    let account_suffix = env_str("ACCOUNT_SUFFIX", Some(format!("-{account_id}")))
        .context("ACCOUNT_SUFFIX must be set")?;
    let sink_account_id = env_str("SINK_ACCOUNT_ID", Some(account_id.clone()))
        .context("SINK_ACCOUNT_ID must be set")?;
    let settle_delay_ms =
        env_u64("SETTLE_DELAY_MS", Some(1_000)).context("SETTLE_DELAY_MS must be a number")?;
    let rotation_wait_min_secs = env_u64("ROTATION_WAIT_MIN_SECS", Some(300))
        .context("ROTATION_WAIT_MIN_SECS must be a number")?;
    let rotation_wait_max_secs = env_u64("ROTATION_WAIT_MAX_SECS", Some(600))
        .context("ROTATION_WAIT_MAX_SECS must be a number")?;
    if rotation_wait_max_secs < rotation_wait_min_secs {
        bail!("ROTATION_WAIT_MAX_SECS must not be below ROTATION_WAIT_MIN_SECS");
    }

    let spin_method =
        env_str("SPIN_METHOD", Some("spin".into())).context("SPIN_METHOD must be set")?;
    let spin_mode = env_parse("SPIN_MODE", Some(SpinMode::Batch))
        .context("SPIN_MODE must be single or batch")?;
    let spins_per_call =
        env_usize("SPINS_PER_CALL", Some(4)).context("SPINS_PER_CALL must be a number")?;
    let spins_per_call = check_spins_per_call(spins_per_call)?;
    let bet_amount =
        env_near("BET_AMOUNT", Some("0.1")).context("BET_AMOUNT must be a NEAR amount")?;
    let callback_gas =
        env_parse("CALLBACK_GAS", Some(3u8)).context("CALLBACK_GAS must fit in a byte")?;
    let call_gas =
        env_u64("CALL_GAS", Some(300 * TGAS)).context("CALL_GAS must be a number")?;
    let max_rounds =
        env_u64("MAX_ROUNDS", Some(1_000)).context("MAX_ROUNDS must be a number")?;
    let max_rounds = (max_rounds > 0).then_some(max_rounds);
    let round_delay_ms =
        env_u64("ROUND_DELAY_MS", Some(500)).context("ROUND_DELAY_MS must be a number")?;
    let stats_every = env_u64("STATS_EVERY", Some(1)).context("STATS_EVERY must be a number")?;
    let verbose = env_bool("VERBOSE", Some(false)).context("VERBOSE must be true or false")?;

    let ft_contract_id = env_str("FT_CONTRACT_ID", None);
    let ft_deposit_amount = env_str("FT_DEPOSIT_AMOUNT", None);

    let log_level = env_str("LOG_LEVEL", Some("info".into())).unwrap_or_default();
    let log_format = env_str("LOG_FORMAT", Some("pretty".into())).unwrap_or_default();
    let log_color = env_bool("LOG_COLOR", Some(true)).unwrap_or(true);

    Ok(RuntimeConfig {
        near_rpc_url,
        rpc_timeout_ms,
        account_id,
        credential,
        contract_id,
        deploy_contract,
        contract_wasm_path,
        faucet_url,
        funding_mode,
        funding_amount,
        account_suffix,
        sink_account_id,
        settle_delay_ms,
        rotation_wait_min_secs,
        rotation_wait_max_secs,
        spin_method,
        spin_mode,
        spins_per_call,
        bet_amount,
        callback_gas,
        call_gas,
        max_rounds,
        round_delay_ms,
        stats_every,
        verbose,
        ft_contract_id,
        ft_deposit_amount,
        log_level,
        log_format,
        log_color,
    })
}

fn check_spins_per_call(spins: usize) -> Result<usize> {
    if !(1..=MAX_SPINS_PER_CALL).contains(&spins) {
        bail!("SPINS_PER_CALL must be between 1 and {MAX_SPINS_PER_CALL}, got {spins}");
    }
    Ok(spins)
}

fn env_str(key: &str, default: Option<String>) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty()).or(default)
}

fn env_parse<T: FromStr>(key: &str, default: Option<T>) -> Option<T> {
    match env::var(key) {
        Ok(v) if !v.is_empty() => v.trim().parse().ok(),
        _ => default,
    }
}

fn env_bool(key: &str, default: Option<bool>) -> Option<bool> {
    env_parse(key, default)
}

fn env_u64(key: &str, default: Option<u64>) -> Option<u64> {
    env_parse(key, default)
}

fn env_usize(key: &str, default: Option<usize>) -> Option<usize> {
    env_parse(key, default)
}

fn env_near(key: &str, default: Option<&str>) -> Option<u128> {
    match env::var(key) {
        Ok(v) if !v.is_empty() => parse_near_amount(&v),
        _ => default.and_then(parse_near_amount),
    }
}

fn env_funding_mode(key: &str, default: Option<FundingMode>) -> Option<FundingMode> {
    match env::var(key).unwrap_or_default().to_lowercase().as_str() {
        "" => default,
        "faucet" => Some(FundingMode::Faucet),
        "payer" => Some(FundingMode::Payer),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spins_per_call_stays_under_the_game_limit() {
        assert_eq!(check_spins_per_call(1).expect("one"), 1);
        assert_eq!(check_spins_per_call(63).expect("max"), 63);
        assert!(check_spins_per_call(64).is_err());
        assert!(check_spins_per_call(0).is_err());
    }

    #[test]
    fn funding_mode_is_case_insensitive() {
        unsafe { env::set_var("HARNESS_TEST_FUNDING_MODE", "Payer") };
        assert_eq!(
            env_funding_mode("HARNESS_TEST_FUNDING_MODE", None),
            Some(FundingMode::Payer)
        );
        unsafe { env::remove_var("HARNESS_TEST_FUNDING_MODE") };
        assert_eq!(
            env_funding_mode("HARNESS_TEST_FUNDING_MODE", Some(FundingMode::Faucet)),
            Some(FundingMode::Faucet)
        );
    }
}
