use core::fmt::Debug;

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cbor::{self, Hash, VerificationKey},
    channel::{L1Channel, L2Channel, L2ChannelInfo},
    cheque::{Cheque, ChequeBody},
    hashlock::{self, LockHasher},
    ledger::Ledger,
    messages::{AdaptorInfo, PayResult, QuoteRequest, QuoteResponse, SquashResponse},
    receipt::{self, UpdateError},
    sig::{Keypair, Signer},
    squash::{DuplicateIndex, Squash, SquashBody},
    wire::AdaptorBus,
};

#[derive(Error, Debug)]
pub enum ClientError<BE: Debug, LE: Debug> {
    #[error("adaptor request failed: {0:?}")]
    Adaptor(BE),
    #[error("ledger request failed: {0:?}")]
    Ledger(LE),
    #[error("failed to encode the signed message")]
    Encoding(#[from] cbor::Error),
    #[error("channel has no receipt")]
    ReceiptNotInitiated,
    #[error("cannot pay {amount}: {available} available, room for {capacity} cheques")]
    InsufficientFunds {
        amount: u64,
        available: u64,
        capacity: usize,
    },
    #[error("receipt rejected the cheque")]
    Receipt(#[from] receipt::Error),
    #[error("revealed secret does not open the lock of cheque {0}")]
    SecretMismatch(u32),
    #[error("failed to fold the unlocked cheques")]
    MakeSquash(#[source] DuplicateIndex),
    #[error("own squash was not applicable")]
    Update(#[from] UpdateError),
}

pub type Error<B, L> = ClientError<<B as AdaptorBus>::Error, <L as Ledger>::Error>;

/// The consumer side of Konduit: opens channels, pays through the adaptor and
/// keeps the channel receipts in sync.
///
/// It holds the key signing cheques and squashes, the connection to the
/// adaptor and access to the ledger. Usually you only need one client.
///
/// Channels are owned by the caller and passed in on every call, the client
/// itself keeps no channel state.
#[derive(Debug)]
pub struct Client<B: AdaptorBus, L: Ledger> {
    pub(crate) bus: B,
    pub(crate) ledger: L,
    signer: Keypair,
}

impl<B: AdaptorBus, L: Ledger> Client<B, L> {
    pub fn new(bus: B, ledger: L, signer: Keypair) -> Self {
        Client {
            bus,
            ledger,
            signer,
        }
    }

    pub fn verification_key(&self) -> VerificationKey {
        self.signer.verification_key()
    }

    pub fn adaptor_info(&self) -> Result<AdaptorInfo, Error<B, L>> {
        self.bus.info().map_err(ClientError::Adaptor)
    }

    /// Locks `amount` on the ledger and starts the channel from the zero
    /// squash.
    pub fn open_channel(&self, info: L2ChannelInfo, amount: u64) -> Result<L2Channel, Error<B, L>> {
        let squash = Squash::make(&self.signer, &info.tag, SquashBody::zero())?;
        let reference = self
            .ledger
            .open(&info.tag, amount)
            .map_err(ClientError::Ledger)?;
        debug!(?reference, amount, "channel opened");
        Ok(L2Channel::open(info, L1Channel::open(reference, amount), squash))
    }

    /// Refreshes the L1 record of `channel` from the ledger.
    pub fn sync_l1(&self, channel: &mut L2Channel) -> Result<(), Error<B, L>> {
        let channels = self
            .ledger
            .channels(channel.tag())
            .map_err(ClientError::Ledger)?;
        channel.update_from_l1(channels);
        Ok(())
    }

    pub fn quote(
        &self,
        channel: &L2Channel,
        request: &QuoteRequest,
    ) -> Result<QuoteResponse, Error<B, L>> {
        let keytag = channel.keytag(&self.verification_key());
        self.bus
            .quote(&keytag, request)
            .map_err(ClientError::Adaptor)
    }

    /// Pays `invoice` with a new cheque under the terms of `quote`.
    ///
    /// The cheque takes the next free index, is locked to `lock` and times out
    /// `quote.relative_timeout` after `now` (posix milliseconds). Once signed
    /// it stays in the receipt even if the adaptor cannot be reached, as it
    /// may have been delivered. Depending on the answer it is then unlocked
    /// ([PayResult::Redeemed]), dropped ([PayResult::Rejected]) or kept as is
    /// ([PayResult::Pending]).
    pub fn pay(
        &self,
        channel: &mut L2Channel,
        quote: &QuoteResponse,
        lock: Hash,
        invoice: &str,
        now: u64,
    ) -> Result<PayResult, Error<B, L>> {
        let receipt = channel.receipt().ok_or(ClientError::ReceiptNotInitiated)?;
        if !channel.can_quote(quote.amount) {
            return Err(ClientError::InsufficientFunds {
                amount: quote.amount,
                available: channel.available(),
                capacity: channel.capacity(),
            });
        }

        let index = receipt.max_index().saturating_add(1);
        let body = ChequeBody::new(
            index,
            quote.amount,
            now.saturating_add(quote.relative_timeout),
            lock,
        );
        let cheque = Cheque::make(&self.signer, channel.tag(), body)?;
        let keytag = channel.keytag(&self.verification_key());
        let receipt = channel
            .receipt_mut()
            .ok_or(ClientError::ReceiptNotInitiated)?;
        receipt.insert(cheque.clone())?;
        debug!(index, amount = quote.amount, "cheque issued");

        let result = self
            .bus
            .pay(&keytag, &cheque, invoice)
            .map_err(ClientError::Adaptor)?;
        match &result {
            PayResult::Redeemed(secret) => {
                if !hashlock::Sha256.opens(secret, &lock) {
                    warn!(index, "adaptor revealed a secret not opening the lock");
                    return Err(ClientError::SecretMismatch(index));
                }
                receipt.unlock(secret);
            }
            PayResult::Rejected(reason) => {
                warn!(index, %reason, "payment rejected");
                receipt.expire(&[index]);
            }
            PayResult::Pending => debug!(index, "payment pending"),
        }
        Ok(result)
    }

    /// Folds every unlocked cheque into a new squash, hands it to the adaptor
    /// and applies it locally.
    pub fn squash(&self, channel: &mut L2Channel) -> Result<SquashResponse, Error<B, L>> {
        let receipt = channel.receipt().ok_or(ClientError::ReceiptNotInitiated)?;
        let body = receipt
            .make_squash_body()
            .map_err(ClientError::MakeSquash)?;
        let squash = Squash::make(&self.signer, channel.tag(), body)?;
        let keytag = channel.keytag(&self.verification_key());

        let response = self
            .bus
            .squash(&keytag, &squash)
            .map_err(ClientError::Adaptor)?;
        channel
            .receipt_mut()
            .ok_or(ClientError::ReceiptNotInitiated)?
            .update(squash)?;
        if response == SquashResponse::Incomplete {
            warn!("adaptor holds unlocked cheques unknown to the receipt");
        }
        Ok(response)
    }
}
