//! Block variants, their hashes and their byte layouts
//!
//! Network form is the variant's fields, then the 64-byte signature, then
//! the 8-byte work nonce. Storage form appends the 32-byte hash of the next
//! block in the account chain. Neither form carries the block type; it
//! travels in the message header or is implied by the storage table.

use crate::account::{to_verifying_key, Account};
use crate::core::proof_of_work::{ProofOfWork, WorkEncoding, WorkHandle, WorkThreshold};
use crate::core::types::{Balance, BlockHash, Link, Signature, VerifyingKey, Work};
use crate::error::{LedgerError, Result};
use crate::utils::blake2b_256;
use std::fmt;
use std::str::FromStr;

const KEY_LEN: usize = 32;
const SIGNATURE_LEN: usize = 64;
const WORK_LEN: usize = 8;
const NEXT_LEN: usize = 32;

/// State block hashes are prefixed with the block type code as a 32-byte integer
const STATE_HASH_PREAMBLE: [u8; 32] = {
    let mut preamble = [0u8; 32];
    preamble[31] = 6;
    preamble
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Invalid,
    NotABlock,
    Send,
    Receive,
    Open,
    Change,
    State,
}

impl BlockType {
    pub const ALL: [BlockType; 7] = [
        BlockType::Invalid,
        BlockType::NotABlock,
        BlockType::Send,
        BlockType::Receive,
        BlockType::Open,
        BlockType::Change,
        BlockType::State,
    ];

    pub fn code(&self) -> u8 {
        match self {
            BlockType::Invalid => 0,
            BlockType::NotABlock => 1,
            BlockType::Send => 2,
            BlockType::Receive => 3,
            BlockType::Open => 4,
            BlockType::Change => 5,
            BlockType::State => 6,
        }
    }

    pub fn from_code(code: u8) -> Result<BlockType> {
        BlockType::ALL
            .into_iter()
            .find(|block_type| block_type.code() == code)
            .ok_or_else(|| LedgerError::Protocol(format!("Unknown block type code: {code}")))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Invalid => "invalid",
            BlockType::NotABlock => "not_a_block",
            BlockType::Send => "send",
            BlockType::Receive => "receive",
            BlockType::Open => "open",
            BlockType::Change => "change",
            BlockType::State => "state",
        }
    }

    /// Whether a block payload of this type can exist
    pub fn is_block(&self) -> bool {
        self.fields_len().is_some()
    }

    fn fields_len(&self) -> Option<usize> {
        match self {
            BlockType::Open => Some(3 * KEY_LEN),
            BlockType::Send => Some(2 * KEY_LEN + Balance::LEN),
            BlockType::Receive | BlockType::Change => Some(2 * KEY_LEN),
            BlockType::State => Some(4 * KEY_LEN + Balance::LEN),
            BlockType::Invalid | BlockType::NotABlock => None,
        }
    }

    /// Network form length: open 168, send 152, receive 136, change 136, state 216
    pub fn packed_len(&self) -> Option<usize> {
        self.fields_len().map(|len| len + SIGNATURE_LEN + WORK_LEN)
    }

    pub fn storage_len(&self) -> Option<usize> {
        self.packed_len().map(|len| len + NEXT_LEN)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        BlockType::ALL
            .into_iter()
            .find(|block_type| block_type.as_str() == s)
            .ok_or_else(|| LedgerError::UnknownType(format!("Unknown block type: {s}")))
    }
}

/// The hashed fields of each variant, in hash and wire order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockContents {
    Open {
        source: BlockHash,
        representative: VerifyingKey,
        account: VerifyingKey,
    },
    Send {
        previous: BlockHash,
        destination: VerifyingKey,
        balance: Balance,
    },
    Receive {
        previous: BlockHash,
        source: BlockHash,
    },
    Change {
        previous: BlockHash,
        representative: VerifyingKey,
    },
    State {
        account: VerifyingKey,
        previous: BlockHash,
        representative: VerifyingKey,
        balance: Balance,
        link: Link,
    },
}

impl BlockContents {
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockContents::Open { .. } => BlockType::Open,
            BlockContents::Send { .. } => BlockType::Send,
            BlockContents::Receive { .. } => BlockType::Receive,
            BlockContents::Change { .. } => BlockType::Change,
            BlockContents::State { .. } => BlockType::State,
        }
    }

    /// Fields in hash and wire order
    fn field_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.block_type().fields_len().unwrap_or_default());
        match self {
            BlockContents::Open {
                source,
                representative,
                account,
            } => {
                out.extend_from_slice(source.as_bytes());
                out.extend_from_slice(representative.as_bytes());
                out.extend_from_slice(account.as_bytes());
            }
            BlockContents::Send {
                previous,
                destination,
                balance,
            } => {
                out.extend_from_slice(previous.as_bytes());
                out.extend_from_slice(destination.as_bytes());
                out.extend_from_slice(&balance.to_be_bytes());
            }
            BlockContents::Receive { previous, source } => {
                out.extend_from_slice(previous.as_bytes());
                out.extend_from_slice(source.as_bytes());
            }
            BlockContents::Change {
                previous,
                representative,
            } => {
                out.extend_from_slice(previous.as_bytes());
                out.extend_from_slice(representative.as_bytes());
            }
            BlockContents::State {
                account,
                previous,
                representative,
                balance,
                link,
            } => {
                out.extend_from_slice(account.as_bytes());
                out.extend_from_slice(previous.as_bytes());
                out.extend_from_slice(representative.as_bytes());
                out.extend_from_slice(&balance.to_be_bytes());
                out.extend_from_slice(link.as_bytes());
            }
        }
        out
    }

    fn read_fields(block_type: BlockType, data: &[u8]) -> Result<BlockContents> {
        let mut reader = FieldReader { data, offset: 0 };
        let contents = match block_type {
            BlockType::Open => BlockContents::Open {
                source: reader.hash()?,
                representative: reader.key()?,
                account: reader.key()?,
            },
            BlockType::Send => BlockContents::Send {
                previous: reader.hash()?,
                destination: reader.key()?,
                balance: reader.balance()?,
            },
            BlockType::Receive => BlockContents::Receive {
                previous: reader.hash()?,
                source: reader.hash()?,
            },
            BlockType::Change => BlockContents::Change {
                previous: reader.hash()?,
                representative: reader.key()?,
            },
            BlockType::State => BlockContents::State {
                account: reader.key()?,
                previous: reader.hash()?,
                representative: reader.key()?,
                balance: reader.balance()?,
                link: Link::from_slice(reader.take(KEY_LEN)?)?,
            },
            other => {
                return Err(LedgerError::Field(format!(
                    "Block type {other} carries no block"
                )))
            }
        };
        Ok(contents)
    }

    pub fn calculate_hash(&self) -> BlockHash {
        let fields = self.field_bytes();
        let digest = match self {
            BlockContents::State { .. } => {
                blake2b_256(&[STATE_HASH_PREAMBLE.as_slice(), fields.as_slice()])
            }
            _ => blake2b_256(&[fields.as_slice()]),
        };
        BlockHash::from_bytes(digest)
    }

    /// What the work nonce is bound to
    pub fn work_root(&self) -> [u8; 32] {
        match self {
            BlockContents::Open { account, .. } => *account.as_bytes(),
            BlockContents::State {
                account, previous, ..
            } => {
                if previous.is_zero() {
                    *account.as_bytes()
                } else {
                    *previous.as_bytes()
                }
            }
            BlockContents::Send { previous, .. }
            | BlockContents::Receive { previous, .. }
            | BlockContents::Change { previous, .. } => *previous.as_bytes(),
        }
    }

    pub fn work_encoding(&self) -> WorkEncoding {
        match self {
            BlockContents::State { .. } => WorkEncoding::BigEndian,
            _ => WorkEncoding::LittleEndian,
        }
    }

    /// Named hex values, for logs and the CLI
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            BlockContents::Open {
                source,
                representative,
                account,
            } => vec![
                ("source", source.to_hex()),
                ("representative", representative.to_hex()),
                ("account", account.to_hex()),
            ],
            BlockContents::Send {
                previous,
                destination,
                balance,
            } => vec![
                ("previous", previous.to_hex()),
                ("destination", destination.to_hex()),
                ("balance", balance.to_hex()),
            ],
            BlockContents::Receive { previous, source } => vec![
                ("previous", previous.to_hex()),
                ("source", source.to_hex()),
            ],
            BlockContents::Change {
                previous,
                representative,
            } => vec![
                ("previous", previous.to_hex()),
                ("representative", representative.to_hex()),
            ],
            BlockContents::State {
                account,
                previous,
                representative,
                balance,
                link,
            } => vec![
                ("account", account.to_hex()),
                ("previous", previous.to_hex()),
                ("representative", representative.to_hex()),
                ("balance", balance.to_hex()),
                ("link", link.to_hex()),
            ],
        }
    }
}

struct FieldReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> FieldReader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.offset + len;
        let slice = self.data.get(self.offset..end).ok_or(LedgerError::Length {
            expected: end,
            actual: self.data.len(),
        })?;
        self.offset = end;
        Ok(slice)
    }

    fn hash(&mut self) -> Result<BlockHash> {
        BlockHash::from_slice(self.take(KEY_LEN)?)
    }

    fn key(&mut self) -> Result<VerifyingKey> {
        VerifyingKey::from_slice(self.take(KEY_LEN)?)
    }

    fn balance(&mut self) -> Result<Balance> {
        let slice = self.take(Balance::LEN)?;
        let bytes: [u8; 16] = slice.try_into().map_err(|_| LedgerError::Length {
            expected: Balance::LEN,
            actual: slice.len(),
        })?;
        Ok(Balance::from_be_bytes(bytes))
    }
}

/// A block with its cached hash, optional signature and work, and the
/// storage-only `next` link (zero when unknown).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    contents: BlockContents,
    hash: BlockHash,
    signature: Option<Signature>,
    work: Option<Work>,
    next: BlockHash,
}

impl Block {
    pub fn new(contents: BlockContents) -> Block {
        let hash = contents.calculate_hash();
        Block {
            contents,
            hash,
            signature: None,
            work: None,
            next: BlockHash::default(),
        }
    }

    pub fn open(source: BlockHash, representative: VerifyingKey, account: VerifyingKey) -> Block {
        Self::new(BlockContents::Open {
            source,
            representative,
            account,
        })
    }

    pub fn send(previous: BlockHash, destination: VerifyingKey, balance: Balance) -> Block {
        Self::new(BlockContents::Send {
            previous,
            destination,
            balance,
        })
    }

    pub fn receive(previous: BlockHash, source: BlockHash) -> Block {
        Self::new(BlockContents::Receive { previous, source })
    }

    pub fn change(previous: BlockHash, representative: VerifyingKey) -> Block {
        Self::new(BlockContents::Change {
            previous,
            representative,
        })
    }

    pub fn state(
        account: VerifyingKey,
        previous: BlockHash,
        representative: VerifyingKey,
        balance: Balance,
        link: Link,
    ) -> Block {
        Self::new(BlockContents::State {
            account,
            previous,
            representative,
            balance,
            link,
        })
    }

    pub fn with_signature(mut self, signature: Signature) -> Block {
        self.signature = Some(signature);
        self
    }

    pub fn with_work(mut self, work: Work) -> Block {
        self.work = Some(work);
        self
    }

    pub fn with_next(mut self, next: BlockHash) -> Block {
        self.next = next;
        self
    }

    pub fn contents(&self) -> &BlockContents {
        &self.contents
    }

    pub fn block_type(&self) -> BlockType {
        self.contents.block_type()
    }

    pub fn hash(&self) -> &BlockHash {
        &self.hash
    }

    /// Recompute the hash from the fields
    pub fn calculate_hash(&self) -> BlockHash {
        self.contents.calculate_hash()
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn work(&self) -> Option<&Work> {
        self.work.as_ref()
    }

    pub fn next(&self) -> &BlockHash {
        &self.next
    }

    pub fn sign(&mut self, account: &Account) -> Result<()> {
        self.signature = Some(account.sign_block(&self.hash)?);
        Ok(())
    }

    pub fn signature_valid(&self, account: &Account) -> bool {
        self.signature
            .as_ref()
            .is_some_and(|signature| account.signature_valid(&self.hash, signature))
    }

    pub fn proof_of_work(&self, threshold: WorkThreshold) -> ProofOfWork {
        ProofOfWork::new(
            self.contents.work_root(),
            threshold,
            self.contents.work_encoding(),
        )
    }

    pub fn work_valid(&self) -> bool {
        self.work_valid_for(WorkThreshold::default())
    }

    /// `false` when no work is attached
    pub fn work_valid_for(&self, threshold: WorkThreshold) -> bool {
        self.work
            .as_ref()
            .is_some_and(|work| self.proof_of_work(threshold).validate(work))
    }

    /// Start a nonce search for this block. Attach the result with `with_work`.
    pub fn generate_work(&self, threshold: WorkThreshold) -> Result<WorkHandle> {
        self.proof_of_work(threshold).spawn()
    }

    pub fn pack(&self) -> Result<Vec<u8>> {
        self.pack_for(WorkThreshold::default())
    }

    /// Fails unless a signature is attached and the work passes `threshold`
    pub fn pack_for(&self, threshold: WorkThreshold) -> Result<Vec<u8>> {
        let signature = self.signature.as_ref().ok_or_else(|| {
            LedgerError::Field(format!("Block {} has no signature", self.hash))
        })?;
        let work = self
            .work
            .as_ref()
            .ok_or_else(|| LedgerError::Field(format!("Block {} has no work", self.hash)))?;
        if !self.proof_of_work(threshold).validate(work) {
            return Err(LedgerError::Field(format!(
                "Block {} work {} is below the threshold",
                self.hash, work
            )));
        }

        let mut out = self.contents.field_bytes();
        out.extend_from_slice(signature.as_bytes());
        out.extend_from_slice(work.as_bytes());
        Ok(out)
    }

    /// Exact inverse of `pack`. The work is not validated here.
    pub fn unpack(block_type: BlockType, data: &[u8]) -> Result<Block> {
        let (fields_len, packed_len) = match (block_type.fields_len(), block_type.packed_len()) {
            (Some(fields_len), Some(packed_len)) => (fields_len, packed_len),
            _ => {
                return Err(LedgerError::Field(format!(
                    "Block type {block_type} carries no block"
                )))
            }
        };
        if data.len() != packed_len {
            return Err(LedgerError::Length {
                expected: packed_len,
                actual: data.len(),
            });
        }

        let contents = BlockContents::read_fields(block_type, &data[..fields_len])?;
        let signature = Signature::from_slice(&data[fields_len..fields_len + SIGNATURE_LEN])?;
        let work = Work::from_slice(&data[fields_len + SIGNATURE_LEN..])?;
        Ok(Block::new(contents)
            .with_signature(signature)
            .with_work(work))
    }

    pub fn to_network_bytes(&self) -> Result<Vec<u8>> {
        self.pack()
    }

    pub fn from_network_bytes(block_type: BlockType, data: &[u8]) -> Result<Block> {
        Self::unpack(block_type, data)
    }

    pub fn to_storage_bytes(&self) -> Result<Vec<u8>> {
        let mut out = self.pack()?;
        out.extend_from_slice(self.next.as_bytes());
        Ok(out)
    }

    pub fn from_storage_bytes(block_type: BlockType, data: &[u8]) -> Result<Block> {
        let expected = block_type.storage_len().unwrap_or(NEXT_LEN);
        if data.len() != expected {
            return Err(LedgerError::Length {
                expected,
                actual: data.len(),
            });
        }
        let (packed, next) = data.split_at(data.len() - NEXT_LEN);
        Ok(Self::unpack(block_type, packed)?.with_next(BlockHash::from_slice(next)?))
    }
}

/// Builds a block from text fields: hex strings, or `xrb_` addresses for
/// key fields. Every setter checks its input immediately.
#[derive(Debug, Clone)]
pub struct BlockBuilder {
    block_type: BlockType,
    source: Option<BlockHash>,
    previous: Option<BlockHash>,
    account: Option<VerifyingKey>,
    representative: Option<VerifyingKey>,
    destination: Option<VerifyingKey>,
    balance: Option<Balance>,
    link: Option<Link>,
    signature: Option<Signature>,
    work: Option<Work>,
    next: Option<BlockHash>,
}

impl BlockBuilder {
    pub fn new(block_type: BlockType) -> BlockBuilder {
        BlockBuilder {
            block_type,
            source: None,
            previous: None,
            account: None,
            representative: None,
            destination: None,
            balance: None,
            link: None,
            signature: None,
            work: None,
            next: None,
        }
    }

    pub fn source(mut self, hash: &str) -> Result<Self> {
        self.source = Some(BlockHash::from_hex(hash)?);
        Ok(self)
    }

    pub fn previous(mut self, hash: &str) -> Result<Self> {
        self.previous = Some(BlockHash::from_hex(hash)?);
        Ok(self)
    }

    pub fn account(mut self, key_or_address: &str) -> Result<Self> {
        self.account = Some(to_verifying_key(key_or_address)?);
        Ok(self)
    }

    pub fn representative(mut self, key_or_address: &str) -> Result<Self> {
        self.representative = Some(to_verifying_key(key_or_address)?);
        Ok(self)
    }

    pub fn destination(mut self, key_or_address: &str) -> Result<Self> {
        self.destination = Some(to_verifying_key(key_or_address)?);
        Ok(self)
    }

    /// 32 hex characters, big-endian
    pub fn balance(mut self, hex: &str) -> Result<Self> {
        self.balance = Some(Balance::from_hex(hex)?);
        Ok(self)
    }

    pub fn balance_raw(mut self, raw: u128) -> Self {
        self.balance = Some(Balance::new(raw));
        self
    }

    /// A source block hash or a destination, as hex or an address
    pub fn link(mut self, hash_or_address: &str) -> Result<Self> {
        let key = to_verifying_key(hash_or_address)?;
        self.link = Some(Link::from_bytes(*key.as_bytes()));
        Ok(self)
    }

    pub fn signature(mut self, signature: &str) -> Result<Self> {
        self.signature = Some(Signature::from_hex(signature)?);
        Ok(self)
    }

    pub fn work(mut self, work: &str) -> Result<Self> {
        self.work = Some(Work::from_hex(work)?);
        Ok(self)
    }

    pub fn next(mut self, hash: &str) -> Result<Self> {
        self.next = Some(BlockHash::from_hex(hash)?);
        Ok(self)
    }

    pub fn build(self) -> Result<Block> {
        let block_type = self.block_type;
        let contents = match block_type {
            BlockType::Open => BlockContents::Open {
                source: required(self.source, "source", block_type)?,
                representative: required(self.representative, "representative", block_type)?,
                account: required(self.account, "account", block_type)?,
            },
            BlockType::Send => BlockContents::Send {
                previous: required(self.previous, "previous", block_type)?,
                destination: required(self.destination, "destination", block_type)?,
                balance: required(self.balance, "balance", block_type)?,
            },
            BlockType::Receive => BlockContents::Receive {
                previous: required(self.previous, "previous", block_type)?,
                source: required(self.source, "source", block_type)?,
            },
            BlockType::Change => BlockContents::Change {
                previous: required(self.previous, "previous", block_type)?,
                representative: required(self.representative, "representative", block_type)?,
            },
            BlockType::State => BlockContents::State {
                account: required(self.account, "account", block_type)?,
                previous: required(self.previous, "previous", block_type)?,
                representative: required(self.representative, "representative", block_type)?,
                balance: required(self.balance, "balance", block_type)?,
                link: required(self.link, "link", block_type)?,
            },
            other => {
                return Err(LedgerError::Field(format!(
                    "Block type {other} carries no block"
                )))
            }
        };

        let mut block = Block::new(contents);
        block.signature = self.signature;
        block.work = self.work;
        if let Some(next) = self.next {
            block.next = next;
        }
        Ok(block)
    }
}

fn required<T>(value: Option<T>, name: &str, block_type: BlockType) -> Result<T> {
    value.ok_or_else(|| {
        LedgerError::Field(format!("A {block_type} block requires the {name} field"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::SigningKey;
    use crate::utils::hex_to_bytes;

    const GENESIS_KEY: &str = "E89208DD038FBB269987689621D52292AE9C35941A7484756ECCED92A65093BA";
    const GENESIS_ADDRESS: &str =
        "xrb_3t6k35gi95xu6tergt6p69ck76ogmitsa8mnijtpxm9fkcm736xtoncuohr3";
    const GENESIS_HASH: &str = "991CF190094C00F0B68E2E5F75F6BEE95A2E0BD93CEAA4A6734DB9F19B728948";

    fn storage(parts: &[&str]) -> Vec<u8> {
        hex_to_bytes(&parts.concat()).unwrap()
    }

    fn genesis_open() -> Block {
        BlockBuilder::new(BlockType::Open)
            .source(GENESIS_KEY).unwrap()
            .representative(GENESIS_ADDRESS).unwrap()
            .account(GENESIS_ADDRESS).unwrap()
            .signature("9F0C933C8ADE004D808EA1985FA746A7E95BA2A38F867640F53EC8F180BDFE9E2C1268DEAD7C2664F356E37ABA362BC58E46DBA03E523A7B5A19E4B6EB12BB02").unwrap()
            .work("91B63FDD1754F062").unwrap()
            .next("A170D51B94E00371ACE76E35AC81DC9405D5D04D4CEBC399AEACE07AE05DD293").unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_genesis_open_hash_and_work() {
        let block = genesis_open();
        assert_eq!(block.hash().to_hex(), GENESIS_HASH);
        assert_eq!(block.calculate_hash(), *block.hash());
        assert!(block.work_valid());
        assert_eq!(block.to_network_bytes().unwrap().len(), 168);
        assert_eq!(block.to_storage_bytes().unwrap().len(), 200);
    }

    #[test]
    fn test_landing_open_storage_bytes() {
        let expected = storage(&[
            "A170D51B94E00371ACE76E35AC81DC9405D5D04D4CEBC399AEACE07AE05DD293",
            "2399A083C600AA0572F5E36247D978FCFC840405F8D4B6D33161C0066A55F431",
            "059F68AAB29DE0D3A27443625C7EA9CDDB6517A8B76FE37727EF6A4D76832AD5",
            "E950FFDF0C9C4DAF43C27AE3993378E4D8AD6FA591C24497C53E07A3BC80468539B0A467992A916F0DDA6F267AD764A3C1A5BDBD8F489DFAE8175EEE0E337402",
            "B1A152A497C097E9",
            "18563C814A54535B7C12BF76A0E23291BA3769536634AB90AD0305776A533E8E",
        ]);
        let block = BlockBuilder::new(BlockType::Open)
            .source("A170D51B94E00371ACE76E35AC81DC9405D5D04D4CEBC399AEACE07AE05DD293").unwrap()
            .representative("xrb_1awsn43we17c1oshdru4azeqjz9wii41dy8npubm4rg11so7dx3jtqgoeahy").unwrap()
            .account("xrb_13ezf4od79h1tgj9aiu4djzcmmguendtjfuhwfukhuucboua8cpoihmh8byo").unwrap()
            .signature("E950FFDF0C9C4DAF43C27AE3993378E4D8AD6FA591C24497C53E07A3BC80468539B0A467992A916F0DDA6F267AD764A3C1A5BDBD8F489DFAE8175EEE0E337402").unwrap()
            .work("B1A152A497C097E9").unwrap()
            .next("18563C814A54535B7C12BF76A0E23291BA3769536634AB90AD0305776A533E8E").unwrap()
            .build()
            .unwrap();

        assert_eq!(
            block.hash().to_hex(),
            "90D0C16AC92DD35814E84BFBCC739A039615D0A42A76EF44ADAEF1D99E9F8A35"
        );
        assert!(block.work_valid());
        assert_eq!(block.to_storage_bytes().unwrap(), expected);
    }

    #[test]
    fn test_genesis_send_storage_round_trip() {
        let data = storage(&[
            GENESIS_HASH,
            "059F68AAB29DE0D3A27443625C7EA9CDDB6517A8B76FE37727EF6A4D76832AD5",
            "FD89D89D89D89D89D89D89D89D89D89D",
            "5B11B17DB9C8FE0CC58CAC6A6EECEF9CB122DA8A81C6D3DB1B5EE3AB065AA8F8CB1D6765C8EB91B58530C5FF5987AD95E6D34BB57F44257E20795EE412E61600",
            "95EE054972CC823C",
            "28129ABCAB003AB246BA22702E0C218794DFFF72AD35FD56880D8E605C0798F6",
        ]);
        let block = Block::from_storage_bytes(BlockType::Send, &data).unwrap();

        assert_eq!(
            block.hash().to_hex(),
            "A170D51B94E00371ACE76E35AC81DC9405D5D04D4CEBC399AEACE07AE05DD293"
        );
        assert!(block.work_valid());
        assert_eq!(
            block.next().to_hex(),
            "28129ABCAB003AB246BA22702E0C218794DFFF72AD35FD56880D8E605C0798F6"
        );
        assert_eq!(block.to_storage_bytes().unwrap(), data);
    }

    #[test]
    fn test_raw_balance_matches_hex_balance() {
        let send = |builder: BlockBuilder| {
            builder
                .previous(GENESIS_HASH).unwrap()
                .destination("059F68AAB29DE0D3A27443625C7EA9CDDB6517A8B76FE37727EF6A4D76832AD5").unwrap()
                .signature("5B11B17DB9C8FE0CC58CAC6A6EECEF9CB122DA8A81C6D3DB1B5EE3AB065AA8F8CB1D6765C8EB91B58530C5FF5987AD95E6D34BB57F44257E20795EE412E61600").unwrap()
                .work("95EE054972CC823C").unwrap()
                .build()
                .unwrap()
        };

        let from_hex = send(
            BlockBuilder::new(BlockType::Send)
                .balance("FD89D89D89D89D89D89D89D89D89D89D")
                .unwrap(),
        );
        let from_raw = send(
            BlockBuilder::new(BlockType::Send)
                .balance_raw(0xFD89_D89D_89D8_9D89_D89D_89D8_9D89_D89D),
        );

        assert_eq!(from_raw.hash(), from_hex.hash());
        assert_eq!(
            from_raw.hash().to_hex(),
            "A170D51B94E00371ACE76E35AC81DC9405D5D04D4CEBC399AEACE07AE05DD293"
        );
        assert_eq!(
            from_raw.to_network_bytes().unwrap(),
            from_hex.to_network_bytes().unwrap()
        );
    }

    #[test]
    fn test_receive_network_round_trip() {
        let data = storage(&[
            "0248F7863AF7E9035B7AD7FC0C7F167DEF305D3D8C3EF85197676B0826B794A2",
            "B55A379FBC452BC50561FD01497296A4F6BF4DF0EF6CDCDCB9DADC9144F0B3EF",
            "1E5841CB81019BBF8EAE4EFACD9B0AF2162CF30D6BB90BB6574B4EDD973E6C8AE7126D4419568BBED3EB875C4D5E242D9C3BB40E7906FB2AF2F9D5A5D5339F01",
            "1F256ED32440CCCF",
        ]);
        let block = Block::from_network_bytes(BlockType::Receive, &data).unwrap();
        assert_eq!(
            block.hash().to_hex(),
            "CBAD1775986A8E6C73827F6FF794C5FA17B84067ABB4C2D429EDD75DC5DB2656"
        );
        assert!(block.work_valid());
        assert_eq!(block.to_network_bytes().unwrap(), data);
    }

    #[test]
    fn test_change_storage_bytes() {
        let expected = storage(&[
            "D228A12E8E10183AFB0CB9C444C88B0E6FB6F03572B41F3C3DB447E7459BC038",
            "023185665A78C297F803FE361C7818F6B9D5EB274E9DFCD2ACE1F92C6A9AF13D",
            "F25DED3FC35937CFFBC4150FCFC81D27B80966ED6D9C3E42EF10278A4264436F7B935744748BAC4A73952585B9C0A0B788019EFB6F3E52D8CB8AEF30DACCD300",
            "EC39F07202CADC4F",
            "0000000000000000000000000000000000000000000000000000000000000000",
        ]);
        let block = BlockBuilder::new(BlockType::Change)
            .previous("D228A12E8E10183AFB0CB9C444C88B0E6FB6F03572B41F3C3DB447E7459BC038").unwrap()
            .representative("xrb_11jjiom7ny84kzw19zjp5jw3jxostqokgmnxzmbcsrhs7jobowbxr19dwbyt").unwrap()
            .signature("F25DED3FC35937CFFBC4150FCFC81D27B80966ED6D9C3E42EF10278A4264436F7B935744748BAC4A73952585B9C0A0B788019EFB6F3E52D8CB8AEF30DACCD300").unwrap()
            .work("EC39F07202CADC4F").unwrap()
            .build()
            .unwrap();

        assert_eq!(
            block.hash().to_hex(),
            "007CC9DDEC9471235D4E37746052EB518FC321890A67884586DD73B18DABC69B"
        );
        assert_eq!(block.to_storage_bytes().unwrap(), expected);
    }

    #[test]
    fn test_state_network_round_trip() {
        let data = storage(&[
            "2AC1A3C9A1BF85D0E8C7FC6B62A0D87C40850760FBF9382FF824F6A042FAF61F",
            "1ED7BB8BBF43DBD9AA5D81E1EDC5F59F95DB714056C0CBE86C9E48AD1C1EF3AE",
            "3FE80B4BC842E82C1C18ABFEEC47EA989E63953BC82AC411F304D13833D52A56",
            "000000120D5C7423002A0CDA22000000",
            "8713D7C032E2E8D6C845FF04EC1F63D9E86EE961A2E61B9D7568EDB79CFE8A9F",
            "B186EF270BFD779A272D7B52727D06B0990E84D358613B5924464CFD9983559AC9B7DD94912D14405E0BBAB681596CFD37A19E406D2623D73C3148A94699940A",
            "FCB4E6B3F4DA6EAE",
        ]);
        let built = BlockBuilder::new(BlockType::State)
            .account("xrb_1cp3nh6t5hw7t5nehz5decifiz41in5p3yzs91qzib9pn33hoxizqo4zos3f").unwrap()
            .previous("1ED7BB8BBF43DBD9AA5D81E1EDC5F59F95DB714056C0CBE86C9E48AD1C1EF3AE").unwrap()
            .representative("xrb_1hza3f7wiiqa7ig3jczyxj5yo86yegcmqk3criaz838j91sxcckpfhbhhra1").unwrap()
            .balance("000000120D5C7423002A0CDA22000000").unwrap()
            .link("8713D7C032E2E8D6C845FF04EC1F63D9E86EE961A2E61B9D7568EDB79CFE8A9F").unwrap()
            .signature("B186EF270BFD779A272D7B52727D06B0990E84D358613B5924464CFD9983559AC9B7DD94912D14405E0BBAB681596CFD37A19E406D2623D73C3148A94699940A").unwrap()
            .work("FCB4E6B3F4DA6EAE").unwrap()
            .build()
            .unwrap();

        assert_eq!(
            built.hash().to_hex(),
            "A5A2E431F88574B2A161C92BD53DAFE05B026902A4C3D9FE33F12234CFFF0D03"
        );
        assert!(built.work_valid());
        assert_eq!(built.to_network_bytes().unwrap(), data);

        let unpacked = Block::from_network_bytes(BlockType::State, &data).unwrap();
        assert_eq!(unpacked, built);
    }

    #[test]
    fn test_state_work_root_falls_back_to_account() {
        let account = VerifyingKey::from_hex(GENESIS_KEY).unwrap();
        let first = Block::state(
            account,
            BlockHash::default(),
            account,
            Balance::new(1),
            Link::default(),
        );
        assert_eq!(first.contents().work_root(), *account.as_bytes());

        let previous = BlockHash::from_bytes([3u8; 32]);
        let later = Block::state(account, previous, account, Balance::new(1), Link::default());
        assert_eq!(later.contents().work_root(), [3u8; 32]);
    }

    #[test]
    fn test_missing_field_is_a_field_error() {
        let result = BlockBuilder::new(BlockType::Send)
            .previous(GENESIS_HASH)
            .unwrap()
            .destination(GENESIS_ADDRESS)
            .unwrap()
            .build();
        assert!(matches!(result, Err(LedgerError::Field(_))));

        let result = BlockBuilder::new(BlockType::NotABlock).build();
        assert!(matches!(result, Err(LedgerError::Field(_))));
    }

    #[test]
    fn test_bad_field_input_fails_immediately() {
        assert!(matches!(
            BlockBuilder::new(BlockType::Open).source("1234"),
            Err(LedgerError::Format(_))
        ));
        assert!(matches!(
            BlockBuilder::new(BlockType::Open)
                .account("xrb_3t6k35gi95xu6tergt6p69ck76ogmitsa8mnijtpxm9fkcm736xtoncuohr1"),
            Err(LedgerError::Format(_))
        ));
    }

    #[test]
    fn test_pack_requires_signature_and_valid_work() {
        let genesis = genesis_open();
        let unsigned = Block::new(genesis.contents().clone()).with_work(*genesis.work().unwrap());
        assert!(matches!(unsigned.pack(), Err(LedgerError::Field(_))));

        let no_work =
            Block::new(genesis.contents().clone()).with_signature(*genesis.signature().unwrap());
        assert!(matches!(no_work.pack(), Err(LedgerError::Field(_))));

        let bad_work = no_work.with_work(Work::from_bytes([0u8; 8]));
        assert!(!bad_work.work_valid());
        assert!(matches!(bad_work.pack(), Err(LedgerError::Field(_))));
    }

    #[test]
    fn test_unpack_checks_length() {
        let packed = genesis_open().pack().unwrap();
        assert_eq!(
            Block::unpack(BlockType::Open, &packed[..167]),
            Err(LedgerError::Length {
                expected: 168,
                actual: 167
            })
        );
        assert!(matches!(
            Block::unpack(BlockType::Send, &packed),
            Err(LedgerError::Length { .. })
        ));
        assert!(matches!(
            Block::from_storage_bytes(BlockType::Open, &packed),
            Err(LedgerError::Length { .. })
        ));
        assert!(matches!(
            Block::unpack(BlockType::Invalid, &packed),
            Err(LedgerError::Field(_))
        ));
    }

    #[test]
    fn test_block_type_codes() {
        for block_type in BlockType::ALL {
            assert_eq!(BlockType::from_code(block_type.code()).unwrap(), block_type);
            assert_eq!(block_type.as_str().parse::<BlockType>().unwrap(), block_type);
        }
        assert_eq!(BlockType::State.code(), 6);
        assert!(matches!(
            BlockType::from_code(7),
            Err(LedgerError::Protocol(_))
        ));
        assert!(matches!(
            "epoch".parse::<BlockType>(),
            Err(LedgerError::UnknownType(_))
        ));
        assert_eq!(BlockType::Receive.packed_len(), Some(136));
        assert_eq!(BlockType::State.packed_len(), Some(216));
        assert_eq!(BlockType::NotABlock.packed_len(), None);
    }

    #[test]
    fn test_sign_and_mine_with_low_threshold() {
        let account = Account::from_signing_key(SigningKey::from_bytes([8u8; 32]));
        let threshold = WorkThreshold::new(0xF000_0000_0000_0000);
        let mut block = Block::change(BlockHash::from_bytes([1u8; 32]), *account.verifying_key());
        block.sign(&account).unwrap();
        assert!(block.signature_valid(&account));

        let work = block.generate_work(threshold).unwrap().join().unwrap();
        let block = block.with_work(work);
        assert!(block.work_valid_for(threshold));

        let packed = block.pack_for(threshold).unwrap();
        let unpacked = Block::unpack(BlockType::Change, &packed).unwrap();
        assert_eq!(unpacked.hash(), block.hash());
        assert!(unpacked.signature_valid(&account));
    }
}
