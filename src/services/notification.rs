//! Fire-and-forget notifications.
//!
//! Services hand a [`Notification`] to a [`Notifier`] and move on. The
//! production [`ChannelNotifier`] queues it on an unbounded channel that
//! [`run_delivery`] drains in the background, so a slow or failing mailer
//! never affects the write that triggered the message.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::NotificationSettings;
use crate::error::HrmsResult;
use crate::models::{Employee, LeaveApplication, LeaveStatus, PayrollRecord};

/// A message addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Recipient email address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Accepts notifications without blocking and without failing the caller.
pub trait Notifier: Send + Sync {
    /// Queues a notification for delivery.
    fn notify(&self, notification: Notification);
}

/// A [`Notifier`] that queues onto a tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Creates a notifier and the receiver to hand to [`run_delivery`].
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if let Err(err) = self.sender.send(notification) {
            warn!(
                to = %err.0.to,
                subject = %err.0.subject,
                "Delivery task has stopped; notification dropped"
            );
        }
    }
}

/// Hands a notification to the outside world.
pub trait Mailer: Send + Sync {
    /// Delivers one message using the given settings.
    fn send(&self, settings: &NotificationSettings, notification: &Notification) -> HrmsResult<()>;
}

/// A [`Mailer`] that records deliveries in the log instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, settings: &NotificationSettings, notification: &Notification) -> HrmsResult<()> {
        info!(
            mail_server = settings.mail_server.as_deref().unwrap_or_default(),
            mail_port = settings.port(),
            sender = settings.sender.as_deref().unwrap_or_default(),
            to = %notification.to,
            subject = %notification.subject,
            "Notification delivered"
        );
        Ok(())
    }
}

/// Drains `receiver` until every [`ChannelNotifier`] has been dropped.
///
/// Messages are dropped with a warning while the mail settings are
/// incomplete. Mailer failures are logged and never retried.
pub async fn run_delivery(
    mut receiver: mpsc::UnboundedReceiver<Notification>,
    settings: NotificationSettings,
    mailer: Arc<dyn Mailer>,
) {
    while let Some(notification) = receiver.recv().await {
        if !settings.is_complete() {
            warn!(
                to = %notification.to,
                subject = %notification.subject,
                "Mail settings incomplete; notification dropped"
            );
            continue;
        }
        if let Err(err) = mailer.send(&settings, &notification) {
            warn!(
                to = %notification.to,
                error = %err,
                "Failed to deliver notification"
            );
        }
    }
    debug!("Notification delivery task stopped");
}

/// Builds the message sent to an employee when their leave is decided.
///
/// Returns `None` for applications that are not approved or rejected.
pub fn leave_decision_notice(
    employee: &Employee,
    application: &LeaveApplication,
) -> Option<Notification> {
    let (subject, body) = match application.status {
        LeaveStatus::Approved => (
            "Leave Request Approved",
            format!(
                "Your leave request has been approved:\n\n\
                 Leave Type: {}\n\
                 Start Date: {}\n\
                 End Date: {}\n\
                 Days: {}\n\n\
                 Enjoy your time off!",
                application.leave_type,
                application.start_date,
                application.end_date,
                application.days_requested
            ),
        ),
        LeaveStatus::Rejected => (
            "Leave Request Rejected",
            format!(
                "Your leave request has been rejected:\n\n\
                 Leave Type: {}\n\
                 Start Date: {}\n\
                 End Date: {}\n\n\
                 Comments: {}\n\n\
                 Please contact HR for more information.",
                application.leave_type,
                application.start_date,
                application.end_date,
                application.comments.as_deref().unwrap_or("No comments provided")
            ),
        ),
        LeaveStatus::Pending | LeaveStatus::Cancelled => return None,
    };

    Some(Notification {
        to: employee.email.clone(),
        subject: subject.to_string(),
        body,
    })
}

/// Builds the message sent to an employee when their payslip is ready.
pub fn payslip_notice(employee: &Employee, record: &PayrollRecord) -> Notification {
    let period = record.pay_period().label();
    Notification {
        to: employee.email.clone(),
        subject: format!("Payslip Generated - {}", period),
        body: format!(
            "Dear {},\n\n\
             Your payslip for {} has been generated.\n\n\
             Net Pay: ${}\n\n\
             Best regards,\n\
             HR Department",
            employee.first_name, period, record.net_pay
        ),
    }
}
