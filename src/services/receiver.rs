//! End-to-end submission processing.
//!
//! [`ReceiverController`] runs one raw message through the pipeline:
//!
//! ```text
//! archive -> for each candidate: header -> period -> resource -> checker
//!                                 -> file -> index -> notify -> unarchive
//! ```
//!
//! A user-facing failure moves on to the next candidate. An operator-fatal
//! failure stops processing at once. Either way the submitter gets exactly
//! one email and the raw message stays in the failed-mail archive.

use std::sync::Arc;

use crate::config::ReceiverConfig;
use crate::domain::{
    CandidateSheet, FiledSheet, IncomingMessage, MessageId, SheetHeader, ValidationOutcome,
};
use crate::error::{ReceiverError, Result};
use crate::providers::mail::{DryRunTransport, MailTransport, SmtpTransport};
use crate::providers::scm::{NoVersionControl, ScmCommand, VersionControl};
use crate::storage::{FailedMailArchive, SheetStore};

use super::{
    ExternalValidator, InclusionIndexer, NotificationDispatcher, ResourceDirectory, SheetChecker,
    SheetExtractor, SheetFiler, SheetGrammar, SignatureValidator,
};

/// Final state of one submission.
#[derive(Debug)]
pub enum Disposition {
    /// A sheet was filed and the submitter was sent the report.
    Done(FiledSheet),
    /// No candidate was acceptable; the submitter was told why.
    UserRejected(ReceiverError),
    /// Processing stopped on a configuration or infrastructure problem.
    OperatorFatal(ReceiverError),
}

impl Disposition {
    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Disposition::Done(_) => 0,
            Disposition::UserRejected(_) | Disposition::OperatorFatal(_) => 1,
        }
    }
}

/// A candidate that made it all the way through.
struct Accepted {
    filed: FiledSheet,
    name: String,
    outcome: ValidationOutcome,
}

/// The failure a rejection mail reports, and who gets it.
struct Rejection {
    error: ReceiverError,
    sheet: Option<String>,
    recipient: String,
}

impl Rejection {
    fn is_specific(&self) -> bool {
        !matches!(self.error, ReceiverError::NoSheetFound { .. })
    }
}

/// Orchestrates extraction, validation, filing and notification.
pub struct ReceiverController<'a> {
    config: &'a ReceiverConfig,
    extractor: SheetExtractor,
    signatures: SignatureValidator,
    checker: Arc<dyn SheetChecker>,
    resources: ResourceDirectory,
    store: SheetStore,
    filer: SheetFiler,
    indexer: InclusionIndexer,
    archive: FailedMailArchive,
    transport: Arc<dyn MailTransport>,
}

impl<'a> ReceiverController<'a> {
    /// Creates a controller with explicit mail and version-control backends.
    ///
    /// The sheet checker defaults to the configured external program.
    pub fn new(
        config: &'a ReceiverConfig,
        transport: Arc<dyn MailTransport>,
        scm: Arc<dyn VersionControl>,
    ) -> Result<Self> {
        let grammar = SheetGrammar::new()
            .map_err(|e| ReceiverError::infrastructure("Cannot compile sheet grammar", e))?;
        let store = SheetStore::new(config.sheet_dir());

        Ok(Self {
            config,
            extractor: SheetExtractor::new(grammar.clone()),
            signatures: SignatureValidator::new(grammar, config.kind, config.signature_file()),
            checker: Arc::new(ExternalValidator::from_config(config)),
            resources: ResourceDirectory::new(config.template_dir()),
            filer: SheetFiler::new(config.kind, store.clone(), scm.clone()),
            indexer: InclusionIndexer::new(store.clone(), scm),
            store,
            archive: FailedMailArchive::new(config.failed_mails_dir()),
            transport,
        })
    }

    /// Creates a controller with the backends the configuration asks for.
    ///
    /// Dry runs print mail to stdout and skip the SCM command.
    pub fn from_config(config: &'a ReceiverConfig) -> Result<Self> {
        let transport: Arc<dyn MailTransport> = if config.dry_run {
            Arc::new(DryRunTransport::new(config.mail.sender.clone()))
        } else {
            Arc::new(
                SmtpTransport::new(&config.mail)
                    .map_err(|e| ReceiverError::infrastructure("Cannot set up mail transport", e))?,
            )
        };

        let scm: Arc<dyn VersionControl> = match &config.scm_command {
            Some(template) => Arc::new(ScmCommand::new(template.clone()).dry_run(config.dry_run)),
            None => Arc::new(NoVersionControl),
        };

        Self::new(config, transport, scm)
    }

    /// Replaces the sheet checker.
    pub fn with_checker(mut self, checker: Arc<dyn SheetChecker>) -> Self {
        self.checker = checker;
        self
    }

    /// Processes one raw message and sends the outcome notification.
    pub async fn process(&mut self, raw: Vec<u8>) -> Disposition {
        let message = IncomingMessage::parse(raw);
        let sender = message
            .sender
            .clone()
            .unwrap_or_else(|| self.config.mail.sender.clone());
        let notifier = NotificationDispatcher::new(self.config.kind, self.transport.clone())
            .in_reply_to(message.message_id.clone());

        tracing::info!(
            message_id = %message.message_id,
            sender = %sender,
            attachments = message.attachments.len(),
            "Processing {} submission",
            self.config.kind
        );

        if let Err(e) = self.bootstrap(&message).await {
            return self.abort(&notifier, &sender, e, None).await;
        }

        let mut rejection: Option<Rejection> = None;
        let extractor = self.extractor.clone();

        for sheet in extractor.candidates(&message) {
            // Each candidate answers to its own resource once that is known.
            let mut resolved = None;
            let result = self.try_candidate(&sheet, &mut resolved).await;
            let recipient = resolved.unwrap_or_else(|| sender.clone());

            match result {
                Ok(accepted) => {
                    return self.finish(&notifier, &recipient, &message.message_id, accepted).await;
                }
                Err(e) if e.is_fatal() => {
                    return self.abort(&notifier, &recipient, e, Some(&sheet.text)).await;
                }
                Err(e) => {
                    tracing::debug!(source = %sheet.source, error = %e, "Candidate rejected");
                    let specific = !matches!(e, ReceiverError::NoSheetFound { .. });
                    let replace = match &rejection {
                        None => true,
                        Some(first) => specific && !first.is_specific(),
                    };
                    if replace {
                        rejection = Some(Rejection {
                            sheet: specific.then(|| sheet.text.clone()),
                            error: e,
                            recipient,
                        });
                    }
                }
            }
        }

        let rejection = rejection.unwrap_or_else(|| Rejection {
            error: ReceiverError::NoSheetFound {
                kind: self.config.kind,
            },
            sheet: None,
            recipient: sender,
        });
        self.reject(
            &notifier,
            &rejection.recipient,
            rejection.error,
            rejection.sheet.as_deref(),
        )
        .await
    }

    /// Creates the store root and archives the raw message.
    async fn bootstrap(&self, message: &IncomingMessage) -> Result<()> {
        self.store.ensure_root().await.map_err(|e| {
            ReceiverError::infrastructure(format!("Cannot create {} store", self.config.kind), e)
        })?;
        self.archive
            .store(&message.message_id, &message.raw)
            .await
            .map_err(|e| ReceiverError::infrastructure("Cannot archive incoming mail", e))?;
        Ok(())
    }

    async fn try_candidate(
        &mut self,
        sheet: &CandidateSheet,
        resolved: &mut Option<String>,
    ) -> Result<Accepted> {
        let header = self
            .signatures
            .read_header(sheet)?
            .ok_or(ReceiverError::NoSheetFound {
                kind: self.config.kind,
            })?;
        tracing::debug!(
            source = %sheet.source,
            resource = %header.resource_id,
            period = %header.period,
            "Sheet header found"
        );

        self.signatures.check(&header).await?;

        let resource = self
            .resources
            .resolve(&header.period, &header.resource_id)
            .await?;
        // Replies about this candidate go to the address on file, not the From header.
        *resolved = Some(resource.email.clone());

        let outcome = self.checker.check(sheet).await?;
        let filed = self.file(sheet, &header).await?;

        Ok(Accepted {
            filed,
            name: resource.name,
            outcome,
        })
    }

    async fn file(&self, sheet: &CandidateSheet, header: &SheetHeader) -> Result<FiledSheet> {
        let filed = self.filer.file(sheet, header).await?;
        if let Err(e) = self.indexer.regenerate(&header.period).await {
            tracing::warn!(error = %e, period = %header.period, "Cannot update inclusion index");
        }
        Ok(filed)
    }

    async fn finish(
        &self,
        notifier: &NotificationDispatcher,
        recipient: &str,
        message_id: &MessageId,
        accepted: Accepted,
    ) -> Disposition {
        let Accepted {
            filed,
            name,
            outcome,
        } = accepted;

        if let Err(e) = notifier
            .send_success(recipient, &name, &filed.period, &outcome)
            .await
        {
            tracing::error!(error = %e, to = recipient, "Cannot send report");
        }

        if let Err(e) = self.archive.remove(message_id).await {
            tracing::warn!(error = %e, "Cannot remove archived message");
        }

        tracing::info!(
            resource = %filed.resource_id,
            period = %filed.period,
            path = %filed.path.display(),
            "{} accepted",
            self.config.kind
        );
        Disposition::Done(filed)
    }

    async fn reject(
        &self,
        notifier: &NotificationDispatcher,
        recipient: &str,
        error: ReceiverError,
        sheet: Option<&str>,
    ) -> Disposition {
        tracing::error!(to = recipient, error = %error, "{} rejected", self.config.kind);

        if let Err(e) = notifier
            .send_rejection(recipient, &error.to_string(), sheet)
            .await
        {
            tracing::error!(error = %e, to = recipient, "Cannot send rejection");
        }
        Disposition::UserRejected(error)
    }

    async fn abort(
        &self,
        notifier: &NotificationDispatcher,
        recipient: &str,
        error: ReceiverError,
        sheet: Option<&str>,
    ) -> Disposition {
        tracing::error!(fatal = true, error = %error, "{} receiver out of service", self.config.kind);

        if let Err(e) = notifier.send_fatal(recipient, sheet).await {
            tracing::error!(error = %e, to = recipient, "Cannot send out-of-service notice");
        }
        Disposition::OperatorFatal(error)
    }
}
