use crate::infra::{
    default_intake_limits, InMemoryApplicationRepository, InMemoryNotificationLog,
    LoggingBrokerGateway,
};
use chrono::Utc;
use clap::Args;
use mortgage_intake::config::SupportContact;
use mortgage_intake::error::AppError;
use mortgage_intake::workflows::intake::{
    ChildrenDisclosure, DocumentKind, IntakeService, StagedFile,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Phone number entering the SMS gate
    #[arg(long, default_value = "+7 (912) 345-67-89")]
    pub(crate) phone: String,
    /// Taxpayer number submitted on the final step
    #[arg(long, default_value = "123456789012")]
    pub(crate) inn: String,
    /// Contact e-mail submitted on the final step
    #[arg(long, default_value = "applicant@mail.example")]
    pub(crate) email: String,
    /// Children disclosure: one, two, or none
    #[arg(long, default_value = "one", value_parser = parse_children)]
    pub(crate) children: ChildrenDisclosure,
    /// Number of passport photos to stage
    #[arg(long, default_value_t = 4)]
    pub(crate) passport_files: usize,
    /// Also leave a message for the support desk
    #[arg(long)]
    pub(crate) support_message: Option<String>,
}

fn parse_children(raw: &str) -> Result<ChildrenDisclosure, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "one" => Ok(ChildrenDisclosure::OneChildUnderSeven),
        "two" => Ok(ChildrenDisclosure::TwoChildrenUnderEighteen),
        "none" => Ok(ChildrenDisclosure::NoChildren),
        other => Err(format!("unknown children option '{other}' (use one|two|none)")),
    }
}

fn photos(prefix: &str, count: usize) -> Vec<StagedFile> {
    (1..=count)
        .map(|n| StagedFile {
            name: format!("{prefix}-{n:02}.jpg"),
            size_bytes: 380 * 1024,
            media_type: "image/jpeg".to_string(),
        })
        .collect()
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        phone,
        inn,
        email,
        children,
        passport_files,
        support_message,
    } = args;

    println!("Mortgage intake demo");

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let notifications = Arc::new(InMemoryNotificationLog::default());
    let broker = Arc::new(LoggingBrokerGateway::default());
    let service = IntakeService::new(
        repository,
        notifications,
        broker.clone(),
        default_intake_limits(),
        SupportContact {
            phone: "+7 (800) 555-35-35".to_string(),
            email: "support@intake.example".to_string(),
        },
    );

    let opened = service.open_session(&phone)?;
    println!("\nSMS gate");
    println!("- Session {} opened for {}", opened.session_id.0, opened.phone);
    println!(
        "- Verification code (no delivery channel, shown directly): {}",
        opened.sms_code
    );
    let session_id = opened.session_id;
    service.verify_code(&session_id, &opened.sms_code)?;
    println!("- Code accepted, session authenticated");

    println!("\nUpload wizard");
    service.begin_application(&session_id)?;
    let staged = service.stage_documents(
        &session_id,
        DocumentKind::Passport,
        photos("passport", passport_files),
    )?;
    println!("- Passport: {} file(s) staged", staged.file_count);
    service.advance(&session_id)?;

    let staged = service.stage_documents(&session_id, DocumentKind::Snils, photos("snils", 1))?;
    println!("- SNILS: {} file(s) staged", staged.file_count);
    service.advance(&session_id)?;

    service.choose_disclosure(&session_id, children)?;
    println!("- Children disclosure: {}", children.label());
    let required = children.children() * default_intake_limits().certificates_per_child;
    if required > 0 {
        let staged = service.stage_documents(
            &session_id,
            DocumentKind::BirthCertificate,
            photos("certificate", required),
        )?;
        println!("- Birth certificates: {} file(s) staged", staged.file_count);
    } else {
        println!("- Birth certificates: not required");
    }
    service.advance(&session_id)?;

    service.set_details(&session_id, &inn, &email)?;
    let application = service.submit(&session_id, Utc::now())?;
    println!(
        "- Submitted application {} -> status {}",
        application.id.0,
        application.status.label()
    );

    println!("\nDashboard");
    for entry in service.history()? {
        let badges: Vec<String> = entry
            .documents
            .iter()
            .map(|badge| format!("{} x{}", badge.label, badge.file_count))
            .collect();
        println!(
            "- [{}] application {} from {} ({})",
            entry.status,
            entry.application_id.0,
            entry.submitted_on,
            badges.join(", ")
        );
    }

    println!("\nDocument archive");
    for row in service.archive()? {
        println!(
            "- {} | {} file(s) | uploaded {}",
            row.label, row.file_count, row.uploaded_on
        );
    }

    println!("\nNotifications");
    for notification in service.notifications(10)? {
        println!("- [{}] {}: {}", notification.kind.accent(), notification.title, notification.body);
    }

    println!("\nBroker handoff");
    for dispatch in broker.dispatches() {
        println!("{}", dispatch.summary());
    }

    if let Some(message) = support_message {
        service.support_request(&session_id, &message)?;
        let relayed = broker.support_requests();
        println!("\nSupport desk");
        for request in relayed {
            println!("- {} wrote: {}", request.phone, request.message);
        }
    }

    Ok(())
}
