//! Kestrel address parsing, validation, and creation.
//!
//! Standard addresses carry a spend and a view public key. Integrated
//! addresses additionally embed a 32-byte payment ID.

use crate::base58;
use crate::constants::{
    address_data_size, get_prefix, prefix_info, AddressType, Network, KEY_SIZE,
    PAYMENT_ID_SIZE,
};
use crate::payment_id::PaymentId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must be a non-empty string")]
    Empty,

    #[error("base58 decode error: {0}")]
    Base58(#[from] base58::Base58Error),

    #[error("unknown address prefix: 0x{0:x}")]
    UnknownPrefix(u64),

    #[error("invalid data length: expected {expected} bytes, got {actual}")]
    InvalidDataLength { expected: usize, actual: usize },

    #[error("address belongs to {actual:?}, expected {expected:?}")]
    WrongNetwork { expected: Network, actual: Network },

    #[error("address must be a standard address, got {0:?}")]
    NotStandard(AddressType),

    #[error("address must be an integrated address, got {0:?}")]
    NotIntegrated(AddressType),
}

/// Result of parsing an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    pub network: Network,
    pub address_type: AddressType,
    pub spend_public_key: [u8; KEY_SIZE],
    pub view_public_key: [u8; KEY_SIZE],
    pub payment_id: Option<PaymentId>,
}

impl ParsedAddress {
    pub fn is_integrated(&self) -> bool {
        self.address_type == AddressType::Integrated
    }

    /// Re-encode this parsed address back to a Base58 string.
    pub fn to_address_string(&self) -> String {
        create_address(
            self.network,
            &self.spend_public_key,
            &self.view_public_key,
            self.payment_id.as_ref(),
        )
    }

    /// The standard address sharing this address's keys.
    pub fn standard_address(&self) -> String {
        create_address(self.network, &self.spend_public_key, &self.view_public_key, None)
    }
}

/// Parse and validate an address string.
pub fn parse_address(address: &str) -> Result<ParsedAddress, AddressError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(AddressError::Empty);
    }

    let (tag, data) = base58::decode_address(address)?;
    let info = prefix_info(tag).ok_or(AddressError::UnknownPrefix(tag))?;

    let expected = address_data_size(info.address_type);
    if data.len() != expected {
        return Err(AddressError::InvalidDataLength { expected, actual: data.len() });
    }

    let mut spend_public_key = [0u8; KEY_SIZE];
    spend_public_key.copy_from_slice(&data[..KEY_SIZE]);

    let mut view_public_key = [0u8; KEY_SIZE];
    view_public_key.copy_from_slice(&data[KEY_SIZE..KEY_SIZE * 2]);

    let payment_id = match info.address_type {
        AddressType::Integrated => {
            let mut pid = [0u8; PAYMENT_ID_SIZE];
            pid.copy_from_slice(&data[KEY_SIZE * 2..]);
            Some(PaymentId::from_bytes(pid))
        }
        AddressType::Standard => None,
    };

    Ok(ParsedAddress {
        network: info.network,
        address_type: info.address_type,
        spend_public_key,
        view_public_key,
        payment_id,
    })
}

/// Parse an address and require it to belong to `network`.
pub fn parse_address_for(address: &str, network: Network) -> Result<ParsedAddress, AddressError> {
    let parsed = parse_address(address)?;
    if parsed.network != network {
        return Err(AddressError::WrongNetwork { expected: network, actual: parsed.network });
    }
    Ok(parsed)
}

/// Validate an address string.
pub fn is_valid_address(address: &str) -> bool {
    parse_address(address).is_ok()
}

/// Create an address from its keys; an integrated address when a payment ID is given.
pub fn create_address(
    network: Network,
    spend_public_key: &[u8; KEY_SIZE],
    view_public_key: &[u8; KEY_SIZE],
    payment_id: Option<&PaymentId>,
) -> String {
    let addr_type = if payment_id.is_some() {
        AddressType::Integrated
    } else {
        AddressType::Standard
    };

    let mut data = Vec::with_capacity(address_data_size(addr_type));
    data.extend_from_slice(spend_public_key);
    data.extend_from_slice(view_public_key);
    if let Some(pid) = payment_id {
        data.extend_from_slice(pid.as_bytes());
    }

    base58::encode_address(get_prefix(network, addr_type), &data)
}

/// Convert a standard address to an integrated address by adding a payment ID.
pub fn to_integrated_address(address: &str, payment_id: &PaymentId) -> Result<String, AddressError> {
    let parsed = parse_address(address)?;
    if parsed.is_integrated() {
        return Err(AddressError::NotStandard(parsed.address_type));
    }
    Ok(create_address(
        parsed.network,
        &parsed.spend_public_key,
        &parsed.view_public_key,
        Some(payment_id),
    ))
}

/// Extract the standard address from an integrated address.
pub fn to_standard_address(address: &str) -> Result<String, AddressError> {
    let parsed = parse_address(address)?;
    if !parsed.is_integrated() {
        return Err(AddressError::NotIntegrated(parsed.address_type));
    }
    Ok(parsed.standard_address())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_address_parses_back() {
        let address = create_address(Network::Mainnet, &[0x01; 32], &[0x02; 32], None);
        let parsed = parse_address(&address).unwrap();
        assert_eq!(parsed.network, Network::Mainnet);
        assert_eq!(parsed.address_type, AddressType::Standard);
        assert_eq!(parsed.spend_public_key, [0x01; 32]);
        assert_eq!(parsed.view_public_key, [0x02; 32]);
        assert!(parsed.payment_id.is_none());
        assert_eq!(parsed.to_address_string(), address);
    }

    #[test]
    fn test_integrated_address_carries_payment_id() {
        let pid = PaymentId::from_bytes([0xAA; 32]);
        let address = create_address(Network::Testnet, &[0x11; 32], &[0x22; 32], Some(&pid));
        let parsed = parse_address(&address).unwrap();
        assert_eq!(parsed.network, Network::Testnet);
        assert!(parsed.is_integrated());
        assert_eq!(parsed.payment_id, Some(pid));
    }

    #[test]
    fn test_integrated_conversion() {
        let standard = create_address(Network::Mainnet, &[0x33; 32], &[0x44; 32], None);
        let pid = PaymentId::from_bytes([0xBB; 32]);

        let integrated = to_integrated_address(&standard, &pid).unwrap();
        assert_ne!(integrated, standard);
        assert_eq!(to_standard_address(&integrated).unwrap(), standard);

        assert!(matches!(
            to_integrated_address(&integrated, &pid),
            Err(AddressError::NotStandard(AddressType::Integrated))
        ));
        assert!(matches!(
            to_standard_address(&standard),
            Err(AddressError::NotIntegrated(AddressType::Standard))
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_address("   "), Err(AddressError::Empty));
        assert!(!is_valid_address("not-an-address"));
    }

    #[test]
    fn test_unknown_prefix() {
        let bogus = base58::encode_address(0x77, &[0u8; 64]);
        assert_eq!(parse_address(&bogus), Err(AddressError::UnknownPrefix(0x77)));
    }

    #[test]
    fn test_wrong_payload_size() {
        let short = base58::encode_address(get_prefix(Network::Mainnet, AddressType::Standard), &[0u8; 40]);
        assert_eq!(
            parse_address(&short),
            Err(AddressError::InvalidDataLength { expected: 64, actual: 40 })
        );
    }

    #[test]
    fn test_network_check() {
        let address = create_address(Network::Testnet, &[0x05; 32], &[0x06; 32], None);
        assert!(parse_address_for(&address, Network::Testnet).is_ok());
        assert_eq!(
            parse_address_for(&address, Network::Mainnet),
            Err(AddressError::WrongNetwork { expected: Network::Mainnet, actual: Network::Testnet })
        );
    }
}
