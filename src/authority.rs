//! Shared state of a certificate authority.
//!
//! The revocation vector sits behind a single mutex: `revoke`, `archive` and the
//! computation of a delta with its state hash never interleave, otherwise the
//! published chain hash could not be reproduced by verifiers. The certificate pool
//! sits behind a read/write lock and is signed and exported from a consistent view.
//! The request counter used to pick the generation mode has its own lock.
use crate::certificate::{parse_signed, CtngCertificate, MergeOutcome, Precertificate};
use crate::config::CaConfig;
use crate::crv::RevocationVector;
use crate::errors::Error;
use crate::extension::LoggerInfo;
use crate::gossip::GossipObject;
use crate::revocation::{prepare_revocation, GenerationMode};
use crate::traits::{EntitySigner, HashFunction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};
use x509_cert::{Certificate, TbsCertificate};

/// Certificates issued during the running period, keyed by subject.
#[derive(Debug, Clone, Default)]
pub struct CertificatePool {
    certs: BTreeMap<String, CtngCertificate>,
    next_rid: u64,
}

impl CertificatePool {
    /// Number of certificates.
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    /// Certificate of `subject`.
    pub fn get(&self, subject: &str) -> Option<&CtngCertificate> {
        self.certs.get(subject)
    }

    /// Certificates ordered by subject.
    pub fn iter(&self) -> impl Iterator<Item = &CtngCertificate> {
        self.certs.values()
    }
}

/// Per certificate record of a pool export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    /// Subject of the certificate.
    pub subject: String,
    /// Record id of the certificate.
    pub rid: u64,
    /// JSON form of the CTng extension as signed.
    pub extension: String,
}

/// CA context: signing identity, revocation vector, certificate pool and the
/// announcements generated so far.
pub struct CaContext<S, H> {
    config: CaConfig,
    signer: S,
    hasher: H,
    crv: Mutex<RevocationVector>,
    pool: RwLock<CertificatePool>,
    revocations: RwLock<BTreeMap<String, GossipObject>>,
    request_count: Mutex<u64>,
}

impl<S: EntitySigner, H: HashFunction> CaContext<S, H> {
    /// Build a context with a zeroed revocation vector and an empty pool.
    pub fn new(config: CaConfig, signer: S, hasher: H) -> Result<Self, Error> {
        config.validate()?;
        info!(
            signer = signer.signer_id(),
            crv_size = config.crv_size,
            "CA context initialised"
        );
        Ok(Self {
            crv: Mutex::new(RevocationVector::with_retention(
                config.crv_size,
                config.cache_retention,
            )),
            pool: RwLock::new(CertificatePool::default()),
            revocations: RwLock::new(BTreeMap::new()),
            request_count: Mutex::new(0),
            config,
            signer,
            hasher,
        })
    }

    /// Configuration of the context.
    pub fn config(&self) -> &CaConfig {
        &self.config
    }

    /// Signing identity of the CA.
    pub fn signer(&self) -> &S {
        &self.signer
    }

    fn crv(&self) -> Result<MutexGuard<'_, RevocationVector>, Error> {
        self.crv.lock().map_err(|_| Error::LockPoisoned("revocation vector"))
    }

    fn pool(&self) -> Result<RwLockReadGuard<'_, CertificatePool>, Error> {
        self.pool.read().map_err(|_| Error::LockPoisoned("certificate pool"))
    }

    fn pool_mut(&self) -> Result<RwLockWriteGuard<'_, CertificatePool>, Error> {
        self.pool.write().map_err(|_| Error::LockPoisoned("certificate pool"))
    }

    /// Copy of the revocation vector.
    pub fn revocation_state(&self) -> Result<RevocationVector, Error> {
        Ok(self.crv()?.clone())
    }

    /// Revoke by revocation identifier.
    pub fn revoke(&self, index: usize) -> Result<(), Error> {
        self.crv()?.revoke(index)
    }

    /// Revoke the certificate of `subject`; its RID is the revocation identifier.
    pub fn revoke_certificate(&self, subject: &str) -> Result<u64, Error> {
        let rid = self
            .pool()?
            .get(subject)
            .ok_or_else(|| Error::NotFound(subject.to_owned()))?
            .rid()?;
        let index = usize::try_from(rid).map_err(|_| Error::InvalidRid(rid))?;
        self.revoke(index)?;
        Ok(rid)
    }

    /// Period rollover: archive the running state under `period`.
    pub fn rollover(&self, period: &str) -> Result<(), Error> {
        self.crv()?.archive(period);
        Ok(())
    }

    /// Encoded delta since the last rollover.
    pub fn delta_vs_pre_update(&self) -> Result<Vec<u8>, Error> {
        self.crv()?.delta_vs_pre_update()
    }

    /// Encoded delta since the snapshot archived under `period`.
    pub fn delta_vs_cache(&self, period: &str) -> Result<Vec<u8>, Error> {
        self.crv()?.delta_vs_cache(period)
    }

    /// Count one announcement request and pick its generation mode.
    pub fn next_generation_mode(&self) -> Result<GenerationMode, Error> {
        let mut count = self
            .request_count
            .lock()
            .map_err(|_| Error::LockPoisoned("request counter"))?;
        *count += 1;
        let interval = self.config.misbehavior_interval;
        if interval > 0 && *count % interval == 0 {
            Ok(GenerationMode::Augmented)
        } else {
            Ok(GenerationMode::Base)
        }
    }

    /// Build, sign and store the revocation announcement of `period`.
    pub fn generate_announcement(
        &self,
        period: &str,
        mode: GenerationMode,
    ) -> Result<GossipObject, Error> {
        let prepared = {
            let crv = self.crv()?;
            prepare_revocation(&crv, period, mode, &self.hasher)?
        };
        let gossip = prepared.sign(&self.signer)?;

        self.revocations
            .write()
            .map_err(|_| Error::LockPoisoned("revocation storage"))?
            .insert(period.to_owned(), gossip.clone());
        info!(period, ?mode, "revocation announcement stored");
        Ok(gossip)
    }

    /// Announcement generated for `period`, for monitors to query.
    pub fn revocation_for(&self, period: &str) -> Result<Option<GossipObject>, Error> {
        Ok(self
            .revocations
            .read()
            .map_err(|_| Error::LockPoisoned("revocation storage"))?
            .get(period)
            .cloned())
    }

    /// Add a certificate body to the pool, assigning the next RID.
    ///
    /// # Errors
    /// * [`Error::DuplicateSubject`] if the subject is already in the pool; the
    ///   existing certificate is left untouched.
    /// * [`Error::IndexOutOfRange`] once every revocation slot has a certificate.
    pub fn issue(&self, tbs: TbsCertificate) -> Result<u64, Error> {
        let mut pool = self.pool_mut()?;
        let subject = tbs.subject.to_string();
        if pool.certs.contains_key(&subject) {
            return Err(Error::DuplicateSubject(subject));
        }
        let rid = pool.next_rid;
        let index = usize::try_from(rid).map_err(|_| Error::InvalidRid(rid))?;
        if index >= self.config.crv_size {
            return Err(Error::IndexOutOfRange {
                index,
                size: self.config.crv_size,
            });
        }
        let cert = CtngCertificate::with_rid(tbs, rid)?;
        pool.certs.insert(subject.clone(), cert);
        pool.next_rid += 1;
        debug!(%subject, rid, "precertificate registered");
        Ok(rid)
    }

    /// Merge the witness returned by a log into the certificate of `subject`.
    pub fn record_inclusion(&self, subject: &str, info: LoggerInfo) -> Result<MergeOutcome, Error> {
        self.pool_mut()?
            .certs
            .get_mut(subject)
            .ok_or_else(|| Error::NotFound(subject.to_owned()))?
            .merge(info)
    }

    /// Precertificates of the whole pool, ordered by subject.
    pub fn precertificates(&self) -> Result<Vec<Precertificate>, Error> {
        self.pool()?
            .iter()
            .map(CtngCertificate::project_precertificate)
            .collect()
    }

    /// Prepare and sign every certificate of the pool.
    pub fn sign_all(&self) -> Result<Vec<Certificate>, Error> {
        let pool = self.pool()?;
        pool.iter()
            .map(|cert| {
                let mut cert = cert.clone();
                cert.prepare_for_signing()?;
                cert.sign(&self.signer)
            })
            .collect()
    }

    /// Signed view of the pool as export records.
    pub fn export(&self) -> Result<Vec<ExportRecord>, Error> {
        self.sign_all()?
            .iter()
            .map(|cert| {
                let ext = parse_signed(cert)?;
                Ok(ExportRecord {
                    subject: cert.tbs_certificate.subject.to_string(),
                    rid: ext.rid(),
                    extension: serde_json::to_string(&ext)?,
                })
            })
            .collect()
    }
}
