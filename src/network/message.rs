//! Message framing: an 8-byte header followed by the payload
//!
//! Header layout: magic (2), version max, version using, version min,
//! message type, extension, block type.

use crate::core::block::BlockType;
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const HEADER_LEN: usize = 8;
/// Vote carried ahead of the block in a `confirm_ack`
pub const REPRESENTATIVE_DATA_LEN: usize = 104;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Invalid,
    NotAType,
    Keepalive,
    Publish,
    ConfirmReq,
    ConfirmAck,
    BulkPull,
    BulkPush,
    FrontierReq,
    BulkPullBlocks,
}

impl MessageType {
    pub const ALL: [MessageType; 10] = [
        MessageType::Invalid,
        MessageType::NotAType,
        MessageType::Keepalive,
        MessageType::Publish,
        MessageType::ConfirmReq,
        MessageType::ConfirmAck,
        MessageType::BulkPull,
        MessageType::BulkPush,
        MessageType::FrontierReq,
        MessageType::BulkPullBlocks,
    ];

    pub fn code(&self) -> u8 {
        match self {
            MessageType::Invalid => 0,
            MessageType::NotAType => 1,
            MessageType::Keepalive => 2,
            MessageType::Publish => 3,
            MessageType::ConfirmReq => 4,
            MessageType::ConfirmAck => 5,
            MessageType::BulkPull => 6,
            MessageType::BulkPush => 7,
            MessageType::FrontierReq => 8,
            MessageType::BulkPullBlocks => 9,
        }
    }

    pub fn from_code(code: u8) -> Result<MessageType> {
        MessageType::ALL
            .into_iter()
            .find(|message_type| message_type.code() == code)
            .ok_or_else(|| LedgerError::Protocol(format!("Unknown message type code: {code}")))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Invalid => "invalid",
            MessageType::NotAType => "not_a_type",
            MessageType::Keepalive => "keepalive",
            MessageType::Publish => "publish",
            MessageType::ConfirmReq => "confirm_req",
            MessageType::ConfirmAck => "confirm_ack",
            MessageType::BulkPull => "bulk_pull",
            MessageType::BulkPush => "bulk_push",
            MessageType::FrontierReq => "frontier_req",
            MessageType::BulkPullBlocks => "bulk_pull_blocks",
        }
    }

    /// Message types whose payload is a single block
    pub fn carries_block(&self) -> bool {
        matches!(
            self,
            MessageType::Publish | MessageType::ConfirmReq | MessageType::ConfirmAck
        )
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        MessageType::ALL
            .into_iter()
            .find(|message_type| message_type.as_str() == s)
            .ok_or_else(|| LedgerError::UnknownType(format!("Unknown message type: {s}")))
    }
}

/// Which network a node talks to; selects the header magic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Test,
    Beta,
    #[default]
    Live,
}

impl Network {
    pub fn magic(&self) -> [u8; 2] {
        match self {
            Network::Test => *b"RA",
            Network::Beta => *b"RB",
            Network::Live => *b"RC",
        }
    }

    pub fn from_magic(magic: [u8; 2]) -> Option<Network> {
        [Network::Test, Network::Beta, Network::Live]
            .into_iter()
            .find(|network| network.magic() == magic)
    }
}

impl FromStr for Network {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "test" => Ok(Network::Test),
            "beta" => Ok(Network::Beta),
            "live" => Ok(Network::Live),
            other => Err(LedgerError::Config(format!("Unknown network: {other}"))),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Network::Test => "test",
            Network::Beta => "beta",
            Network::Live => "live",
        })
    }
}

/// What this node writes into every header it sends, and the magic it
/// expects on every header it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Protocol {
    pub network: Network,
    pub version_max: u8,
    pub version_using: u8,
    pub version_min: u8,
}

impl Default for Protocol {
    fn default() -> Self {
        Protocol {
            network: Network::Live,
            version_max: 5,
            version_using: 5,
            version_min: 1,
        }
    }
}

impl Protocol {
    pub fn header(&self, message_type: MessageType, block_type: BlockType) -> MessageHeader {
        MessageHeader {
            magic: self.network.magic(),
            version_max: self.version_max,
            version_using: self.version_using,
            version_min: self.version_min,
            message_type,
            extension: 0,
            block_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub magic: [u8; 2],
    pub version_max: u8,
    pub version_using: u8,
    pub version_min: u8,
    pub message_type: MessageType,
    pub extension: u8,
    pub block_type: BlockType,
}

impl MessageHeader {
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        [
            self.magic[0],
            self.magic[1],
            self.version_max,
            self.version_using,
            self.version_min,
            self.message_type.code(),
            self.extension,
            self.block_type.code(),
        ]
    }

    /// Versions are carried through as-is; only the type codes are checked
    pub fn parse(data: &[u8]) -> Result<MessageHeader> {
        let bytes: &[u8; HEADER_LEN] = data
            .get(..HEADER_LEN)
            .and_then(|head| head.try_into().ok())
            .ok_or_else(|| {
                LedgerError::Protocol(format!(
                    "Message of {} bytes is shorter than its header",
                    data.len()
                ))
            })?;
        Ok(MessageHeader {
            magic: [bytes[0], bytes[1]],
            version_max: bytes[2],
            version_using: bytes[3],
            version_min: bytes[4],
            message_type: MessageType::from_code(bytes[5])?,
            extension: bytes[6],
            block_type: BlockType::from_code(bytes[7])?,
        })
    }
}

/// A decoded message. `representative` is empty unless the message is a
/// `confirm_ack`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub representative: Vec<u8>,
    pub block: Vec<u8>,
}

impl Message {
    pub fn message_type(&self) -> MessageType {
        self.header.message_type
    }

    pub fn block_type(&self) -> BlockType {
        self.header.block_type
    }

    pub fn into_parts(self) -> (MessageType, BlockType, Vec<u8>, Vec<u8>) {
        (
            self.header.message_type,
            self.header.block_type,
            self.representative,
            self.block,
        )
    }
}

pub fn encode(
    protocol: &Protocol,
    message_type: MessageType,
    block_type: BlockType,
    representative_data: &[u8],
    block_data: &[u8],
) -> Vec<u8> {
    let header = protocol.header(message_type, block_type);
    let mut out = Vec::with_capacity(HEADER_LEN + representative_data.len() + block_data.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(representative_data);
    out.extend_from_slice(block_data);
    out
}

/// Frame a payload, looking the type names up in the code tables
pub fn message_encode(
    protocol: &Protocol,
    message_type: &str,
    block_type: &str,
    representative_data: &[u8],
    block_data: &[u8],
) -> Result<Vec<u8>> {
    Ok(encode(
        protocol,
        message_type.parse()?,
        block_type.parse()?,
        representative_data,
        block_data,
    ))
}

/// Split a datagram into header, vote and block payloads.
///
/// A magic that is not `protocol`'s network is a `Protocol` error.
pub fn message_decode(protocol: &Protocol, data: &[u8]) -> Result<Message> {
    let header = MessageHeader::parse(data)?;
    if header.magic != protocol.network.magic() {
        return Err(LedgerError::Protocol(format!(
            "Magic {:02X}{:02X} is not the {} network",
            header.magic[0], header.magic[1], protocol.network
        )));
    }

    let body = &data[HEADER_LEN..];
    let (representative, block) = if header.message_type == MessageType::ConfirmAck {
        if body.len() < REPRESENTATIVE_DATA_LEN {
            return Err(LedgerError::Protocol(format!(
                "confirm_ack body of {} bytes has no room for a vote",
                body.len()
            )));
        }
        body.split_at(REPRESENTATIVE_DATA_LEN)
    } else {
        (&body[..0], body)
    };

    Ok(Message {
        header,
        representative: representative.to_vec(),
        block: block.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hex_to_bytes;

    // Captured traffic was sent with versions 10/10/7
    fn captured() -> Protocol {
        Protocol {
            network: Network::Live,
            version_max: 0x0A,
            version_using: 0x0A,
            version_min: 0x07,
        }
    }

    fn bytes(parts: &[&str]) -> Vec<u8> {
        hex_to_bytes(&parts.concat()).unwrap()
    }

    #[test]
    fn test_publish_receive_fixture() {
        let block = bytes(&[
            "6B6181C1AC75DAABD30CEAE15D44D30D238198968A5A794E057DC36503120550",
            "7716EF323E3079CF8BF9E7EFD1C40F60F8DD3251F24D3F455098EEA90A33572E",
            "3226710D0BD7D3E355F3F1D985AF8BA1B2EB9B346752DEF6F8C14C2C0E91C663A34B3F800E332E48913F7F1F65FF86342490B9C2F97D4FFF50B8F98ACD3DC90F",
            "86C3565BE806C52B",
        ]);
        let mut raw = bytes(&["52430A0A07030003"]);
        raw.extend_from_slice(&block);

        let encoded = message_encode(&captured(), "publish", "receive", &[], &block).unwrap();
        assert_eq!(encoded, raw);

        let (message_type, block_type, vote, payload) =
            message_decode(&captured(), &raw).unwrap().into_parts();
        assert_eq!(message_type, MessageType::Publish);
        assert_eq!(block_type, BlockType::Receive);
        assert!(vote.is_empty());
        assert_eq!(payload, block);
    }

    #[test]
    fn test_confirm_ack_splits_the_vote() {
        let vote = bytes(&[
            "E65294CF9E0192FE2E62E001F61806E7A207CD82B7005120F00EEABA2AC89E00",
            "440C3C58C57EB163C3ECC833F8CDBC1BA8CEF40DDF665506C9740D4F35E7E3E0FD743EC0371D46A81E6509CC7FEE154097F0AAF8C006FE8D8E47A3E02EADCB0F",
            "15D9A70400000000",
        ]);
        let block = bytes(&[
            "7B60805A2D681470CCBDEC381331C0DC3EA35451FEEED6FD6FB3E799D28A837D",
            "D95FEEEB8B08DA598821A72199141ED75D5860BCCB0CA4E041E1387207F9C993",
            "573113B6C57AB5877EC532F19E6C2F7CFD389C955FA5DDC9C03A35E29CB1632E",
            "B1D9B2E7FE5CF7CD5AD7CC18DB1F72225DED46527936A10E2E316CA114276021022BE9BB20D009770BF200BFACB18D53761D9B1CD2B8157D4AB96957AD155C0B",
            "55D10F0608FEE817",
        ]);
        assert_eq!(vote.len(), REPRESENTATIVE_DATA_LEN);

        let encoded = message_encode(&captured(), "confirm_ack", "open", &vote, &block).unwrap();
        assert_eq!(&encoded[..HEADER_LEN], bytes(&["52430A0A07050004"]).as_slice());
        assert_eq!(encoded.len(), 280);

        let message = message_decode(&captured(), &encoded).unwrap();
        assert_eq!(message.message_type(), MessageType::ConfirmAck);
        assert_eq!(message.block_type(), BlockType::Open);
        assert_eq!(message.representative, vote);
        assert_eq!(message.block, block);
    }

    #[test]
    fn test_every_type_pair_decodes_to_itself() {
        let protocol = Protocol::default();
        let vote = [7u8; REPRESENTATIVE_DATA_LEN];
        for message_type in MessageType::ALL {
            for block_type in BlockType::ALL {
                let representative: &[u8] = if message_type == MessageType::ConfirmAck {
                    &vote
                } else {
                    &[]
                };
                let encoded = encode(&protocol, message_type, block_type, representative, b"blk");
                let decoded = message_decode(&protocol, &encoded).unwrap().into_parts();
                assert_eq!(
                    decoded,
                    (message_type, block_type, representative.to_vec(), b"blk".to_vec())
                );
            }
        }
    }

    #[test]
    fn test_default_header_bytes() {
        let encoded = message_encode(&Protocol::default(), "keepalive", "invalid", &[], &[]).unwrap();
        assert_eq!(encoded, vec![0x52, 0x43, 5, 5, 1, 2, 0, 0]);
    }

    #[test]
    fn test_wrong_magic_is_rejected() {
        let beta = Protocol {
            network: Network::Beta,
            ..Protocol::default()
        };
        let encoded = encode(&beta, MessageType::Publish, BlockType::Send, &[], &[1, 2]);
        assert!(matches!(
            message_decode(&Protocol::default(), &encoded),
            Err(LedgerError::Protocol(_))
        ));
        assert!(message_decode(&beta, &encoded).is_ok());
    }

    #[test]
    fn test_malformed_headers_are_protocol_errors() {
        let protocol = Protocol::default();
        assert!(matches!(
            message_decode(&protocol, &[0x52, 0x43, 5]),
            Err(LedgerError::Protocol(_))
        ));
        assert!(matches!(
            message_decode(&protocol, &[0x52, 0x43, 5, 5, 1, 0x0B, 0, 0]),
            Err(LedgerError::Protocol(_))
        ));
        assert!(matches!(
            message_decode(&protocol, &[0x52, 0x43, 5, 5, 1, 3, 0, 0x09]),
            Err(LedgerError::Protocol(_))
        ));

        let short_ack = encode(&protocol, MessageType::ConfirmAck, BlockType::Open, &[0; 10], &[]);
        assert!(matches!(
            message_decode(&protocol, &short_ack),
            Err(LedgerError::Protocol(_))
        ));
    }

    #[test]
    fn test_unknown_type_names() {
        let protocol = Protocol::default();
        assert!(matches!(
            message_encode(&protocol, "gossip", "send", &[], &[]),
            Err(LedgerError::UnknownType(_))
        ));
        assert!(matches!(
            message_encode(&protocol, "publish", "epoch", &[], &[]),
            Err(LedgerError::UnknownType(_))
        ));
    }

    #[test]
    fn test_network_magic() {
        assert_eq!(Network::Test.magic(), [0x52, 0x41]);
        assert_eq!(Network::from_magic(*b"RB"), Some(Network::Beta));
        assert_eq!(Network::from_magic(*b"XX"), None);
        assert_eq!("LIVE".parse::<Network>().unwrap(), Network::Live);
    }
}
