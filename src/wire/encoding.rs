use core::fmt::Debug;

use alloc::{string::String, vec::Vec};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::trace;

use super::{AdaptorBus, BytesBus};
use crate::{
    cheque::Cheque,
    messages::{
        AdaptorInfo, PayRequest, PayResult, QuoteRequest, QuoteResponse, SquashRequest,
        SquashResponse,
    },
    squash::Squash,
};

#[derive(Error, Debug)]
pub enum EncodingError<E: Debug> {
    #[error("transport failed: {0:?}")]
    Transport(E),
    #[error("malformed json")]
    Json(#[from] serde_json::Error),
}

/// Speaks the adaptor's JSON dialect over a [BytesBus].
#[derive(Debug)]
pub struct JsonEncodingLayer<B: BytesBus> {
    pub bus: B,
}

impl<B: BytesBus> JsonEncodingLayer<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    fn get<R: DeserializeOwned>(&self, endpoint: &str) -> Result<R, EncodingError<B::Error>> {
        trace!(endpoint, "get");
        let res = self.bus.get(endpoint).map_err(EncodingError::Transport)?;
        Ok(serde_json::from_slice(&res)?)
    }

    fn post<T, R>(&self, endpoint: &str, keytag: &[u8], req: &T) -> Result<R, EncodingError<B::Error>>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let keytag: String = hex::encode(keytag);
        let body: Vec<u8> = serde_json::to_vec(req)?;
        trace!(endpoint, len = body.len(), "post");
        let res = self
            .bus
            .post(endpoint, &keytag, &body)
            .map_err(EncodingError::Transport)?;
        Ok(serde_json::from_slice(&res)?)
    }
}

impl<B: BytesBus> AdaptorBus for JsonEncodingLayer<B> {
    type Error = EncodingError<B::Error>;

    fn info(&self) -> Result<AdaptorInfo, Self::Error> {
        self.get("/info")
    }

    fn quote(&self, keytag: &[u8], request: &QuoteRequest) -> Result<QuoteResponse, Self::Error> {
        self.post("/ch/quote", keytag, request)
    }

    fn squash(&self, keytag: &[u8], squash: &Squash) -> Result<SquashResponse, Self::Error> {
        let req = SquashRequest {
            squash: squash.clone(),
        };
        self.post("/ch/squash", keytag, &req)
    }

    fn pay(&self, keytag: &[u8], cheque: &Cheque, invoice: &str) -> Result<PayResult, Self::Error> {
        let req = PayRequest {
            cheque: cheque.clone(),
            invoice: invoice.into(),
        };
        self.post("/ch/pay", keytag, &req)
    }
}
