//! Certificates under construction by a CA.
//!
//! A [`CtngCertificate`] is a to-be-signed body whose extension list holds the CTng
//! extension, plus the list of extensions pending for the final signature. Loggers
//! are handed a [`Precertificate`]; once their witnesses come back they are merged
//! into the extension and the certificate is signed.
use crate::errors::Error;
use crate::extension::{self, CtngExtension, LoggerInfo};
use crate::traits::EntitySigner;
use tracing::{debug, warn};
use x509_cert::der::asn1::BitString;
use x509_cert::der::Encode;
use x509_cert::ext::Extension;
use x509_cert::{Certificate, TbsCertificate};

/// Result of merging a witness into a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The witness was appended.
    Appended,
    /// A witness from the same log signer was already present; nothing changed.
    DuplicateIgnored,
}

/// Certificate body as held in the CA pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtngCertificate {
    /// To-be-signed body. Its extension list is the one read and updated by
    /// [`CtngCertificate::merge`].
    pub tbs: TbsCertificate,
    /// Extensions installed for the eventual signature. They take precedence over
    /// extensions of `tbs` with the same identifier.
    pub pending_extensions: Vec<Extension>,
}

/// Reduced certificate shape submitted to logs: the body of a certificate whose CTng
/// extension keeps the sequence number but carries no witness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Precertificate(pub TbsCertificate);

fn extensions_of(tbs: &TbsCertificate) -> &[Extension] {
    tbs.extensions.as_deref().unwrap_or(&[])
}

impl CtngCertificate {
    /// Wrap a body; nothing is pending yet.
    pub fn new(tbs: TbsCertificate) -> Self {
        Self {
            tbs,
            pending_extensions: Vec::new(),
        }
    }

    /// Wrap a body and install a fresh CTng extension carrying `rid`.
    pub fn with_rid(tbs: TbsCertificate, rid: u64) -> Result<Self, Error> {
        let mut cert = Self::new(tbs);
        cert.install_extension(&CtngExtension::new(rid))?;
        Ok(cert)
    }

    /// Extensions of the body.
    pub fn extensions(&self) -> &[Extension] {
        extensions_of(&self.tbs)
    }

    /// Subject of the certificate in its RFC 4514 string form.
    pub fn subject(&self) -> String {
        self.tbs.subject.to_string()
    }

    /// The CTng extension if the body carries one.
    pub fn find_extension(&self) -> Result<Option<CtngExtension>, Error> {
        extension::find(self.extensions())
    }

    /// The CTng extension, or an empty one when the body carries none.
    pub fn parse_extension(&self) -> Result<CtngExtension, Error> {
        extension::parse(self.extensions())
    }

    /// Record id of the certificate.
    pub fn rid(&self) -> Result<u64, Error> {
        Ok(self.parse_extension()?.rid())
    }

    /// Write `ext` into the body, replacing the value of an existing CTng extension.
    pub fn install_extension(&mut self, ext: &CtngExtension) -> Result<(), Error> {
        let extensions = self.tbs.extensions.get_or_insert_with(Vec::new);
        extension::install(extensions, ext)
    }

    /// Append the witness of a log, unless a witness from the same log signer is
    /// already present.
    ///
    /// # Errors
    /// Fails with [`Error::MissingExtension`] if the body has no CTng extension yet.
    pub fn merge(&mut self, info: LoggerInfo) -> Result<MergeOutcome, Error> {
        let mut ext = self.find_extension()?.ok_or(Error::MissingExtension)?;

        if ext.has_witness_from(&info.sth.signer) {
            warn!(
                logger = %info.sth.signer,
                rid = ext.rid(),
                "witness already present, ignoring"
            );
            return Ok(MergeOutcome::DuplicateIgnored);
        }

        debug!(logger = %info.sth.signer, rid = ext.rid(), "witness merged");
        ext.logger_information.push(info);
        self.install_extension(&ext)?;
        Ok(MergeOutcome::Appended)
    }

    /// Install the current CTng extension as a non critical pending extension so
    /// the signature covers it. Calling it again overwrites the pending value.
    ///
    /// A body without the extension gets an empty one as well, so that witnesses
    /// can be merged afterwards.
    pub fn prepare_for_signing(&mut self) -> Result<(), Error> {
        let ext = match self.find_extension()? {
            Some(ext) => ext,
            None => {
                let ext = CtngExtension::default();
                self.install_extension(&ext)?;
                ext
            }
        };
        extension::install(&mut self.pending_extensions, &ext)
    }

    /// Body with the CTng extension stripped of every witness. Every other field and
    /// extension is kept as is.
    pub fn project_precertificate(&self) -> Result<Precertificate, Error> {
        let ext = self.parse_extension()?.precertificate_view();
        let mut tbs = self.tbs.clone();
        extension::install(tbs.extensions.get_or_insert_with(Vec::new), &ext)?;
        Ok(Precertificate(tbs))
    }

    /// Body as it will be signed: pending extensions replace extensions of the body
    /// with the same identifier and are appended otherwise.
    pub fn to_be_signed(&self) -> TbsCertificate {
        let mut tbs = self.tbs.clone();
        let extensions = tbs.extensions.get_or_insert_with(Vec::new);
        for pending in &self.pending_extensions {
            match extensions.iter_mut().find(|e| e.extn_id == pending.extn_id) {
                Some(existing) => *existing = pending.clone(),
                None => extensions.push(pending.clone()),
            }
        }
        tbs
    }

    /// Sign the body with `signer`.
    pub fn sign<S: EntitySigner + ?Sized>(&self, signer: &S) -> Result<Certificate, Error> {
        let mut tbs = self.to_be_signed();
        tbs.signature = signer.algorithm();
        let der = tbs.to_der()?;
        let signature = signer.sign(&der)?;

        Ok(Certificate {
            tbs_certificate: tbs,
            signature_algorithm: signer.algorithm(),
            signature: BitString::from_bytes(signature.as_bytes())?,
        })
    }
}

impl Precertificate {
    /// The CTng extension of the precertificate.
    pub fn extension(&self) -> Result<CtngExtension, Error> {
        extension::parse(extensions_of(&self.0))
    }

    /// DER encoding of the body, as submitted to logs.
    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        Ok(self.0.to_der()?)
    }
}

/// Prepare every certificate of `certs` for signing.
pub fn prepare_all_for_signing(certs: &mut [CtngCertificate]) -> Result<(), Error> {
    certs.iter_mut().try_for_each(CtngCertificate::prepare_for_signing)
}

/// The CTng extension of an issued certificate, or an empty one.
pub fn parse_signed(cert: &Certificate) -> Result<CtngExtension, Error> {
    extension::parse(extensions_of(&cert.tbs_certificate))
}
