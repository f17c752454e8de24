// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use thiserror::Error;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid VPC ID format: {0} (expected vpc-<hex>)")]
    InvalidVpcId(String),

    #[error("Invalid subnet ID format: {0} (expected subnet-<hex>)")]
    InvalidSubnetId(String),

    #[error("Invalid security group ID format: {0} (expected sg-<hex>)")]
    InvalidSecurityGroupId(String),

    #[error("Invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid prefix length: {0} (must be 0-32 for IPv4, 0-128 for IPv6)")]
    InvalidPrefixLength(u8),
}

fn has_hex_suffix(value: &str, prefix: &str) -> bool {
    match value.strip_prefix(prefix) {
        Some(suffix) => {
            !suffix.is_empty()
                && suffix
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        }
        None => false,
    }
}

/// VPC identifier value object
///
/// Invariants:
/// - `vpc-` prefix
/// - Non-empty lowercase hex suffix
///
/// # Examples
///
/// ```rust
/// use rds_topology::domain::VpcId;
///
/// let vpc = VpcId::new("vpc-0a1b2c3d").unwrap();
/// assert_eq!(vpc.as_str(), "vpc-0a1b2c3d");
/// assert!(VpcId::new("vpc-XYZ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VpcId(String);

impl VpcId {
    /// Create a new VPC ID with validation
    pub fn new(id: impl Into<String>) -> Result<Self, NetworkError> {
        let id = id.into();
        if !has_hex_suffix(&id, "vpc-") {
            return Err(NetworkError::InvalidVpcId(id));
        }
        Ok(Self(id))
    }

    /// Get the VPC ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VpcId {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Subnet identifier value object (`subnet-<hex>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubnetId(String);

impl SubnetId {
    /// Create a new subnet ID with validation
    pub fn new(id: impl Into<String>) -> Result<Self, NetworkError> {
        let id = id.into();
        if !has_hex_suffix(&id, "subnet-") {
            return Err(NetworkError::InvalidSubnetId(id));
        }
        Ok(Self(id))
    }

    /// Get the subnet ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubnetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Security group identifier value object (`sg-<hex>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityGroupId(String);

impl SecurityGroupId {
    /// Create a new security group ID with validation
    pub fn new(id: impl Into<String>) -> Result<Self, NetworkError> {
        let id = id.into();
        if !has_hex_suffix(&id, "sg-") {
            return Err(NetworkError::InvalidSecurityGroupId(id));
        }
        Ok(Self(id))
    }

    /// Get the security group ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecurityGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// CIDR block value object
///
/// Represents an IPv4 or IPv6 network range in CIDR notation. Unlike a bare
/// address, the prefix length is mandatory here: access-control rules always
/// describe ranges.
///
/// Invariants:
/// - Valid IP address format
/// - Prefix length present and within range for the IP version
///
/// # Examples
///
/// ```rust
/// use rds_topology::domain::CidrBlock;
///
/// let cidr = CidrBlock::new("10.0.0.0/16").unwrap();
/// assert_eq!(cidr.prefix_length(), 16);
/// assert!(cidr.is_ipv4());
///
/// assert!(CidrBlock::new("10.0.0.0").is_err());      // No prefix
/// assert!(CidrBlock::new("10.0.0.0/33").is_err());   // Prefix out of range
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CidrBlock {
    address: IpAddr,
    prefix_length: u8,
}

impl CidrBlock {
    /// Create a new CIDR block with validation
    ///
    /// # Invariants
    /// - `address/prefix` form
    /// - Prefix length 0-32 for IPv4, 0-128 for IPv6
    pub fn new(cidr: impl AsRef<str>) -> Result<Self, NetworkError> {
        let cidr = cidr.as_ref();

        let (addr_str, prefix_str) = cidr
            .split_once('/')
            .ok_or_else(|| NetworkError::InvalidCidr(cidr.to_string()))?;

        let address = IpAddr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidIpAddress(addr_str.to_string()))?;

        let prefix_length = prefix_str
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidCidr(cidr.to_string()))?;

        // Invariant: Validate prefix length based on IP version
        let max_prefix = match address {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };

        if prefix_length > max_prefix {
            return Err(NetworkError::InvalidPrefixLength(prefix_length));
        }

        Ok(Self {
            address,
            prefix_length,
        })
    }

    /// Get the network address
    pub fn address(&self) -> IpAddr {
        self.address
    }

    /// Get the prefix length
    pub fn prefix_length(&self) -> u8 {
        self.prefix_length
    }

    /// Check if this is an IPv4 range
    pub fn is_ipv4(&self) -> bool {
        matches!(self.address, IpAddr::V4(_))
    }

    /// Get as CIDR notation string
    pub fn as_cidr(&self) -> String {
        format!("{}/{}", self.address, self.prefix_length)
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_cidr())
    }
}

impl FromStr for CidrBlock {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CidrBlock {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CidrBlock> for String {
    fn from(value: CidrBlock) -> Self {
        value.as_cidr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vpc_id() {
        let vpc = VpcId::new("vpc-0a1b2c3d4e5f").unwrap();
        assert_eq!(vpc.as_str(), "vpc-0a1b2c3d4e5f");

        assert!(VpcId::new("vpc-").is_err()); // Empty suffix
        assert!(VpcId::new("vpc-XYZ").is_err()); // Uppercase
        assert!(VpcId::new("subnet-abc123").is_err()); // Wrong prefix
        assert!(VpcId::new("0a1b2c").is_err()); // No prefix
    }

    #[test]
    fn test_subnet_id() {
        assert!(SubnetId::new("subnet-0123abcd").is_ok());
        assert!(SubnetId::new("subnet-").is_err());
        assert!(SubnetId::new("vpc-0123abcd").is_err());
    }

    #[test]
    fn test_security_group_id() {
        assert!(SecurityGroupId::new("sg-0badcafe").is_ok());
        assert!(SecurityGroupId::new("sg-ghij").is_err()); // Non-hex
    }

    #[test]
    fn test_cidr_block() {
        let cidr = CidrBlock::new("10.0.0.0/16").unwrap();
        assert_eq!(cidr.prefix_length(), 16);
        assert!(cidr.is_ipv4());
        assert_eq!(cidr.as_cidr(), "10.0.0.0/16");
    }

    #[test]
    fn test_cidr_ipv6() {
        let cidr = CidrBlock::new("2001:db8::/64").unwrap();
        assert!(!cidr.is_ipv4());
        assert_eq!(cidr.prefix_length(), 64);
    }

    #[test]
    fn test_invalid_cidr() {
        assert!(CidrBlock::new("10.0.0.0").is_err()); // Missing prefix
        assert!(CidrBlock::new("999.0.0.0/8").is_err()); // Bad address
        assert!(CidrBlock::new("10.0.0.0/33").is_err()); // IPv4 prefix too long
        assert!(CidrBlock::new("2001:db8::/129").is_err()); // IPv6 prefix too long
    }

    #[test]
    fn test_cidr_serde_round_trip() {
        let cidr = CidrBlock::new("192.168.0.0/24").unwrap();
        let json = serde_json::to_string(&cidr).unwrap();
        assert_eq!(json, "\"192.168.0.0/24\"");
        let back: CidrBlock = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cidr);
    }
}
