use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Settlement API - run the server or manage admin users")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print an argon2 hash for a password
    ///
    /// The hash can be inserted into `admin_users.password_hash` by hand.
    /// Reads the password from stdin when --password is not given.
    HashPassword(HashPasswordArgs),

    /// Create an admin account in the database
    ///
    /// Requires the MYSQL_* environment variables.
    CreateAdmin(CreateAdminArgs),
}

#[derive(ClapArgs, Debug)]
pub struct HashPasswordArgs {
    #[arg(short, long, help = "Password to hash (prompted on stdin if omitted)")]
    pub password: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct CreateAdminArgs {
    #[arg(short, long, help = "Username for the admin")]
    pub username: String,

    #[arg(short, long, help = "Email address for the admin")]
    pub email: String,

    #[arg(short, long, help = "Password for the admin")]
    pub password: String,
}
