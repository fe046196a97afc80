//! Per-environment contract address book.
//!
//! The hub currently runs against a single Gnosis Chain deployment; all
//! environments therefore resolve to the same address set, but the seam
//! is kept so staging and production deployments can diverge without
//! touching any consumer.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{address, b256, Address, B256};

/// Gnosis Chain.
pub const CHAIN_ID: u64 = 100;

/// Symbol of the chain's native currency, used as the fallback currency
/// label for transfers without token metadata.
pub const NATIVE_CURRENCY: &str = "xDai";

/// Default base URL of the Safe transaction-relay service.
pub const DEFAULT_RELAY_URL: &str = "https://safe-transaction.stage.hoprtech.net";

/// Deployment environment selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Dev,
    Node,
    Web3,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Node => "node",
            Self::Web3 => "web3",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "node" => Ok(Self::Node),
            "web3" => Ok(Self::Web3),
            _ => Err(format!(
                "Unknown environment: {s}. Supported environments are: dev, node, web3"
            )),
        }
    }
}

/// On-chain addresses and constants for one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addresses {
    pub chain_id: u64,
    /// xHOPR (xdai-bridged HOPR), the unwrapped token.
    pub xhopr_token: Address,
    /// wxHOPR, the ERC-777 wrapped token used for staking.
    pub wxhopr_token: Address,
    /// mHOPR, the token the dev deployment stakes with.
    pub mhopr_token: Address,
    /// Wrapper contract converting xHOPR <-> wxHOPR.
    pub wxhopr_wrapper: Address,
    pub channels: Address,
    pub announcement: Address,
    pub boost_nft: Address,
    pub node_stake_factory: Address,
    pub node_management_module: Address,
    pub node_safe_registry: Address,
    /// Canonical Safe MultiSend, delegatecalled for batched proposals.
    pub multisend: Address,
    /// Canonical ERC-1820 registry, same address on every chain.
    pub erc1820_registry: Address,
    /// ERC-1820 interface hash registered during safe onboarding.
    pub erc1820_interface_hash: B256,
    /// Implementer the hub registers for that interface hash.
    pub erc1820_implementer: Address,
}

impl Addresses {
    /// Returns the address book for the given environment.
    pub fn for_environment(_env: Environment) -> Self {
        // One Gnosis deployment serves every environment today.
        Self {
            chain_id: CHAIN_ID,
            xhopr_token: address!("0xd057604a14982fe8d88c5fc25aac3267ea142a08"),
            wxhopr_token: address!("0xd4fdec44db9d44b8f2b6d529620f9c0c7066a2c1"),
            mhopr_token: address!("0x66225de86cac02b32f34992eb3410f59de416698"),
            wxhopr_wrapper: address!("0x097707143e01318734535676cfe2e5cf8b656ae8"),
            channels: address!("0xfabee463f31e39ec8952bbfb4490c41103bf573e"),
            announcement: address!("0x619eabe23fd0e2291b50a507719aa633fe6069b8"),
            boost_nft: address!("0x43d13d7b83607f14335cf2cb75e87da369d056c7"),
            node_stake_factory: address!("0x6e078019eee40b249fa3a876e7a6b089b77cff9b"),
            node_management_module: address!("0x683d3859dfb5a8c0f00703f9466f4cc09a6431d2"),
            node_safe_registry: address!("0x715978dc28c44410a187c7d3d5a308c7d7b1096d"),
            multisend: address!("0xa238cbeb142c10ef7ad8442c6d1f9e89e07e7761"),
            erc1820_registry: address!("0x1820a4b7618bde71dce8cdc73aab6c95905fad24"),
            erc1820_interface_hash: b256!(
                "0xb281fc8c12954d22544db45de3159a39272895b169a852b314f9cc762e44c53b"
            ),
            erc1820_implementer: address!("0xe530e2f9decf24d7d42f011f54f1e9f8001e7619"),
        }
    }

    /// The token the hub stakes with in this deployment.
    pub fn hopr_token(&self) -> Address {
        self.mhopr_token
    }
}

impl Default for Addresses {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_round_trip() {
        for env in [Environment::Dev, Environment::Node, Environment::Web3] {
            assert_eq!(env.as_str().parse::<Environment>().unwrap(), env);
        }
        assert!("mainnet".parse::<Environment>().is_err());
    }

    #[test]
    fn environments_share_gnosis_deployment() {
        let dev = Addresses::for_environment(Environment::Dev);
        let web3 = Addresses::for_environment(Environment::Web3);
        assert_eq!(dev, web3);
        assert_eq!(dev.chain_id, CHAIN_ID);
    }
}
