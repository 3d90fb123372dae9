use supplychain_chaincode::{Chaincode, ChaincodeConfig, DevHost};
use supplychain_products::SupplyChainContract;

fn main() -> anyhow::Result<()> {
    let config = ChaincodeConfig::from_env()?;
    supplychain_observability::init(config.log_format);

    let host = DevHost::new(Chaincode::new(config.name.clone(), SupplyChainContract::new()));

    if config.init_ledger {
        host.bootstrap(config.init_timestamp)?;
    }

    tracing::info!(
        chaincode = %config.name,
        functions = ?host.chaincode().functions(),
        "chaincode ready; reading invocations from stdin"
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    host.serve(stdin.lock(), stdout.lock())
}
