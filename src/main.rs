/// Command line entry point
/// This file is part of the outermost layer (Frameworks & Drivers)

use ipass_provisioning::config::{InviteMode, ProvisioningConfig};
use ipass_provisioning::domain::{CustomerId, HostedUser, InviteMessage, InviteNotifier, UsernameDomain};
use ipass_provisioning::infrastructure::{ApiCredentials, HttpInviteNotifier, IpassHttpClient, QueueInviteNotifier};
use ipass_provisioning::use_cases::{
    ChangeHostedUserStateUseCase, CreateHostedUserUseCase, SearchHostedUserUseCase, SendInvitesUseCase,
    UpdateHostedUserUseCase,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "Usage: ipass_provisioning <config.xml> <command> [args]

Commands:
  create  <customer_id> <username> <domain> <email> [full name] [--no-invite]
  update  <customer_id> <username> <domain> <email> [full name]
  get     <customer_id> <username@domain>
  find    <customer_id> <username@domain>
  suspend <customer_id> <username@domain>
  delete  <customer_id> <username@domain>
  activate <customer_id> <username@domain>
  refresh <customer_id> <username@domain>
  invite  <email> <activation_url>";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Create {
        customer: CustomerId,
        user: HostedUser,
        send_invite: bool,
    },
    Update {
        customer: CustomerId,
        user: HostedUser,
    },
    Get(CustomerId, UsernameDomain),
    Find(CustomerId, UsernameDomain),
    Suspend(CustomerId, UsernameDomain),
    Delete(CustomerId, UsernameDomain),
    Activate(CustomerId, UsernameDomain),
    Refresh(CustomerId, UsernameDomain),
    Invite(InviteMessage),
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ipass_provisioning=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    }

    let command = match parse_command(&args[1..]) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };

    let config = match ProvisioningConfig::load(&args[0]) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::debug!("Loaded {:?}", config);

    match run(command, &config).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: &ProvisioningConfig) -> anyhow::Result<String> {
    let api = Arc::new(IpassHttpClient::with_base_url(&config.api_key, config.api_base_url.clone())?);

    let output = match command {
        Command::Create {
            customer,
            user,
            send_invite,
        } => {
            let notifier = build_notifier(config).await?;
            let created = CreateHostedUserUseCase::new(api, notifier, config.document_settings())
                .execute(customer, &user, send_invite)
                .await?;
            if send_invite && !created.invite_sent {
                tracing::error!("Invite to {} was not delivered", created.email);
            }
            format!("{}\n{}", created.hosted_user_id, created.activation_url)
        }
        Command::Update { customer, user } => {
            UpdateHostedUserUseCase::new(api, config.document_settings())
                .execute(customer, &user)
                .await?
        }
        Command::Get(customer, login) => SearchHostedUserUseCase::new(api).execute(customer, &login).await?,
        Command::Find(customer, login) => {
            match SearchHostedUserUseCase::new(api).find(customer, &login).await? {
                Some(user) => format!(
                    "{}\t{}\t{}\t{}",
                    user.username_domain(),
                    user.hosted_auth_id.unwrap_or_default(),
                    user.email,
                    user.hosted_auth_url.unwrap_or_default()
                ),
                None => anyhow::bail!("No hosted user {} for customer {}", login, customer),
            }
        }
        Command::Suspend(customer, login) => ChangeHostedUserStateUseCase::new(api).suspend(customer, &login).await?,
        Command::Delete(customer, login) => ChangeHostedUserStateUseCase::new(api).delete(customer, &login).await?,
        Command::Activate(customer, login) => {
            ChangeHostedUserStateUseCase::new(api)
                .activate(customer, &login)
                .await?
                .raw
        }
        Command::Refresh(customer, login) => {
            ChangeHostedUserStateUseCase::new(api)
                .refresh_activation_url(customer, &login)
                .await?
        }
        Command::Invite(invite) => {
            let notifier = build_notifier(config).await?;
            let email = invite.email.clone();
            SendInvitesUseCase::new(notifier).send_one(invite).await?;
            format!("Invite sent to {}", email)
        }
    };

    Ok(output)
}

async fn build_notifier(config: &ProvisioningConfig) -> anyhow::Result<Arc<dyn InviteNotifier>> {
    let notifier: Arc<dyn InviteNotifier> = match config.invite_mode()? {
        InviteMode::Http {
            endpoint,
            username,
            password,
        } => Arc::new(HttpInviteNotifier::new(endpoint, ApiCredentials { username, password })?),
        InviteMode::Queue { queue_url } => Arc::new(QueueInviteNotifier::from_env(queue_url).await),
    };
    Ok(notifier)
}

fn parse_command(args: &[String]) -> Result<Command, String> {
    let (name, rest) = args.split_first().ok_or_else(|| "Missing command".to_string())?;

    match name.as_str() {
        "create" => {
            let send_invite = !rest.iter().any(|a| a == "--no-invite");
            let rest: Vec<String> = rest.iter().filter(|a| *a != "--no-invite").cloned().collect();
            let (customer, user) = parse_user(&rest)?;
            Ok(Command::Create {
                customer,
                user,
                send_invite,
            })
        }
        "update" => {
            let (customer, user) = parse_user(rest)?;
            Ok(Command::Update { customer, user })
        }
        "get" | "find" | "suspend" | "delete" | "activate" | "refresh" => {
            let [customer, login] = rest else {
                return Err(format!("'{}' expects <customer_id> <username@domain>", name));
            };
            let customer = parse_customer(customer)?;
            let login = UsernameDomain::parse(login.as_str()).map_err(|e| e.to_string())?;
            Ok(match name.as_str() {
                "get" => Command::Get(customer, login),
                "find" => Command::Find(customer, login),
                "suspend" => Command::Suspend(customer, login),
                "delete" => Command::Delete(customer, login),
                "activate" => Command::Activate(customer, login),
                _ => Command::Refresh(customer, login),
            })
        }
        "invite" => {
            let [email, activation_url] = rest else {
                return Err("'invite' expects <email> <activation_url>".to_string());
            };
            Ok(Command::Invite(InviteMessage::new(email.as_str(), activation_url.as_str())))
        }
        other => Err(format!("Unknown command: {}", other)),
    }
}

fn parse_user(args: &[String]) -> Result<(CustomerId, HostedUser), String> {
    if args.len() < 4 {
        return Err("Expected <customer_id> <username> <domain> <email> [full name]".to_string());
    }
    let customer = parse_customer(&args[0])?;
    let full_name = args[4..].join(" ");
    let user = HostedUser::new(args[1].as_str(), args[2].as_str(), args[3].as_str(), full_name)
        .map_err(|e| e.to_string())?;
    Ok((customer, user))
}

fn parse_customer(value: &str) -> Result<CustomerId, String> {
    value
        .parse::<i32>()
        .map(CustomerId::new)
        .map_err(|_| format!("Invalid customer id: {}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_create_with_name() {
        let command = parse_command(&args(&["create", "42", "jdoe", "example.com", "john@mail.com", "John", "Doe"])).unwrap();
        match command {
            Command::Create {
                customer,
                user,
                send_invite,
            } => {
                assert_eq!(customer.value(), 42);
                assert_eq!(user.full_name, "John Doe");
                assert!(send_invite);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_create_without_invite() {
        let command = parse_command(&args(&["create", "42", "jdoe", "example.com", "john@mail.com", "--no-invite"])).unwrap();
        assert!(matches!(command, Command::Create { send_invite: false, .. }));
    }

    #[test]
    fn test_parse_login_commands() {
        let command = parse_command(&args(&["refresh", "7", "jdoe@example.com"])).unwrap();
        assert_eq!(
            command,
            Command::Refresh(CustomerId::new(7), UsernameDomain::parse("jdoe@example.com").unwrap())
        );
        assert!(parse_command(&args(&["suspend", "7"])).is_err());
        assert!(parse_command(&args(&["suspend", "7", "not-a-login"])).is_err());
    }

    #[test]
    fn test_parse_invalid_customer() {
        assert!(parse_command(&args(&["get", "abc", "jdoe@example.com"])).is_err());
    }

    #[test]
    fn test_parse_unknown_command() {
        assert!(parse_command(&args(&["frobnicate"])).is_err());
    }
}
