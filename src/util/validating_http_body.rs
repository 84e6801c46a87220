use std::pin::Pin;
use std::task::{Context, Poll};

use anyhow::anyhow;
use bytes::Bytes;
use futures_core::{ready, Stream};
use hyper::Body;
use pin_project_lite::pin_project;
use sha1::digest::consts::U20;
use sha1::digest::generic_array::GenericArray;
use sha1::{Digest, Sha1};
use tracing::trace;

/// Wraps an HTTP body so it can be consumed without materializing it while still
///  running validations that need the entire body's data (checksum checks).
///
/// The contract is to append a chunk with an error to the stream if validation
///  fails at the end. Once an error chunk was returned, this stream stops polling
///  upstream and keeps returning an error.
pin_project! {
    pub struct ValidatingHttpBody {
        #[pin]
        http_body: Body,
        validators: Vec<Box<dyn HttpBodyValidator>>,
        is_failed: bool,
    }
}

impl ValidatingHttpBody {
    pub fn new(http_body: Body, validators: Vec<Box<dyn HttpBodyValidator>>) -> ValidatingHttpBody {
        ValidatingHttpBody {
            http_body,
            validators,
            is_failed: false,
        }
    }
}

impl Stream for ValidatingHttpBody {
    type Item = anyhow::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.is_failed {
            return Poll::Ready(Some(Err(anyhow!("polling from failed stream"))));
        }

        let this = self.project();
        let inner = ready!(this.http_body.poll_next(cx));
        match inner {
            Some(Ok(data)) => {
                // data from the wrapped HTTP body -> feed the validators, pass it on
                for validator in this.validators.iter_mut() {
                    validator.add_data(&data);
                }
                Poll::Ready(Some(Ok(data)))
            }
            None => {
                // wrapped HTTP body is fully drained -> finalize validation
                for validator in this.validators.iter() {
                    if let Err(e) = validator.verify() {
                        *this.is_failed = true;
                        return Poll::Ready(Some(Err(e)));
                    }
                }
                Poll::Ready(None)
            }
            Some(Err(e)) => {
                *this.is_failed = true;
                Poll::Ready(Some(Err(e.into())))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.http_body.size_hint()
    }
}

pub trait HttpBodyValidator: Send {
    fn add_data(&mut self, data: &Bytes);
    fn verify(&self) -> anyhow::Result<()>;
}

pub struct Sha1BodyValidator {
    hasher: Sha1,
    expected_hash: GenericArray<u8, U20>,
}

impl Sha1BodyValidator {
    pub fn new(expected_hash: [u8; 20]) -> Sha1BodyValidator {
        Sha1BodyValidator {
            hasher: Default::default(),
            expected_hash: expected_hash.into(),
        }
    }
}

impl HttpBodyValidator for Sha1BodyValidator {
    fn add_data(&mut self, data: &Bytes) {
        self.hasher.update(data);
    }

    fn verify(&self) -> anyhow::Result<()> {
        trace!("validating SHA1 hash");
        let hash = self.hasher.clone().finalize();
        if hash == self.expected_hash {
            Ok(())
        } else {
            Err(anyhow!("SHA1 checksum mismatch"))
        }
    }
}

pub struct Md5BodyValidator {
    context: md5::Context,
    expected_hash: [u8; 16],
}

impl Md5BodyValidator {
    pub fn new(expected_hash: [u8; 16]) -> Md5BodyValidator {
        Md5BodyValidator {
            context: md5::Context::new(),
            expected_hash,
        }
    }
}

impl HttpBodyValidator for Md5BodyValidator {
    fn add_data(&mut self, data: &Bytes) {
        self.context.consume(data);
    }

    fn verify(&self) -> anyhow::Result<()> {
        trace!("validating MD5 hash");
        let hash: [u8; 16] = self.context.clone().compute().into();
        if hash == self.expected_hash {
            Ok(())
        } else {
            Err(anyhow!("MD5 checksum mismatch"))
        }
    }
}
