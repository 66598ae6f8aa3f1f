use crate::core::block::Block;
use crate::core::proof_of_work::WorkThreshold;
use crate::error::Result;
use crate::network::message::{message_decode, MessageType, Protocol};
use crate::network::peers::{empty_peer, unpack_peers};
use crate::utils::bytes_to_hex;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct BlockSummary {
    pub hash: String,
    pub work_valid: bool,
    pub signature: Option<String>,
    pub work: Option<String>,
    pub fields: BTreeMap<&'static str, String>,
}

impl BlockSummary {
    pub fn new(block: &Block, threshold: WorkThreshold) -> BlockSummary {
        BlockSummary {
            hash: block.hash().to_hex(),
            work_valid: block.work_valid_for(threshold),
            signature: block.signature().map(|s| s.to_hex()),
            work: block.work().map(|w| w.to_hex()),
            fields: block.contents().fields().into_iter().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageSummary {
    pub message_type: String,
    pub block_type: String,
    pub version_max: u8,
    pub version_using: u8,
    pub version_min: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub representative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub peers: Vec<String>,
}

/// Describe a raw message: header fields, then the carried block or the
/// keepalive peers.
pub fn summarize(
    protocol: &Protocol,
    data: &[u8],
    threshold: WorkThreshold,
) -> Result<MessageSummary> {
    let message = message_decode(protocol, data)?;
    let header = message.header;

    let block = if header.message_type.carries_block() && header.block_type.is_block() {
        let block = Block::from_network_bytes(header.block_type, &message.block)?;
        Some(BlockSummary::new(&block, threshold))
    } else {
        None
    };

    let peers = if header.message_type == MessageType::Keepalive {
        unpack_peers(&message.block)
            .into_iter()
            .filter(|peer| *peer != empty_peer())
            .map(|peer| peer.to_string())
            .collect()
    } else {
        Vec::new()
    };

    Ok(MessageSummary {
        message_type: header.message_type.to_string(),
        block_type: header.block_type.to_string(),
        version_max: header.version_max,
        version_using: header.version_using,
        version_min: header.version_min,
        representative: (!message.representative.is_empty())
            .then(|| bytes_to_hex(&message.representative)),
        block,
        peers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hex_to_bytes;

    #[test]
    fn test_summarize_publish() {
        let data = hex_to_bytes(concat!(
            "52430B0B07040003",
            "0248F7863AF7E9035B7AD7FC0C7F167DEF305D3D8C3EF85197676B0826B794A2",
            "B55A379FBC452BC50561FD01497296A4F6BF4DF0EF6CDCDCB9DADC9144F0B3EF",
            "1E5841CB81019BBF8EAE4EFACD9B0AF2162CF30D6BB90BB6574B4EDD973E6C8A",
            "E7126D4419568BBED3EB875C4D5E242D9C3BB40E7906FB2AF2F9D5A5D5339F01",
            "1F256ED32440CCCF",
        ))
        .unwrap();
        let summary = summarize(&Protocol::default(), &data, WorkThreshold::default()).unwrap();
        assert_eq!(summary.message_type, "confirm_req");
        assert_eq!(summary.block_type, "receive");
        assert_eq!(summary.version_max, 0x0B);

        let block = summary.block.as_ref().unwrap();
        assert_eq!(
            block.hash,
            "CBAD1775986A8E6C73827F6FF794C5FA17B84067ABB4C2D429EDD75DC5DB2656"
        );
        assert!(block.work_valid);
        assert_eq!(
            block.fields["source"],
            "B55A379FBC452BC50561FD01497296A4F6BF4DF0EF6CDCDCB9DADC9144F0B3EF"
        );

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["block"]["work"], "1F256ED32440CCCF");
        assert!(json.get("peers").is_none());
        assert!(json.get("representative").is_none());
    }

    #[test]
    fn test_summarize_keepalive_lists_peers() {
        let data = hex_to_bytes(concat!(
            "52430A0A07020000",
            "00000000000000000000ffff2578a7a4a31b",
        ))
        .unwrap();
        let summary = summarize(&Protocol::default(), &data, WorkThreshold::default()).unwrap();
        assert_eq!(summary.message_type, "keepalive");
        assert_eq!(summary.peers, vec!["[::ffff:37.120.167.164]:7075".to_string()]);
        assert!(summary.block.is_none());
    }
}
