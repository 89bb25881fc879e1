//! Command-line interface for xsd-datatypes

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use xsd_datatypes::{Facet, SchemaVersion, SimpleTypeDecl, TypeUniverse};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xsd-datatypes")]
#[command(author, version, about = "XML Schema simple-type validation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate literals against a built-in type
    Validate {
        /// Built-in type name, e.g. `int` or `xs:dateTime`
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        type_name: String,

        /// Use XSD 1.1 datatypes
        #[arg(long)]
        xsd11: bool,

        /// Literals to validate
        #[arg(value_name = "VALUE", required = true)]
        values: Vec<String>,
    },

    /// Compare two literals of a built-in type
    Compare {
        /// Built-in type name
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        type_name: String,

        /// Use XSD 1.1 datatypes
        #[arg(long)]
        xsd11: bool,

        /// First literal
        #[arg(value_name = "A")]
        a: String,

        /// Second literal
        #[arg(value_name = "B")]
        b: String,
    },

    /// Show the facets of a built-in type
    Inspect {
        /// Built-in type name
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        type_name: String,

        /// Use XSD 1.1 datatypes
        #[arg(long)]
        xsd11: bool,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List the built-in type names
    Types {
        /// Use XSD 1.1 datatypes
        #[arg(long)]
        xsd11: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate {
            type_name,
            xsd11,
            values,
        } => cmd_validate(&type_name, xsd11, &values),
        Commands::Compare {
            type_name,
            xsd11,
            a,
            b,
        } => cmd_compare(&type_name, xsd11, &a, &b),
        Commands::Inspect {
            type_name,
            xsd11,
            json,
        } => cmd_inspect(&type_name, xsd11, json),
        Commands::Types { xsd11 } => cmd_types(xsd11),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "cli")]
fn universe(xsd11: bool) -> &'static TypeUniverse {
    if xsd11 {
        TypeUniverse::for_version(SchemaVersion::V1_1)
    } else {
        TypeUniverse::for_version(SchemaVersion::V1_0)
    }
}

#[cfg(feature = "cli")]
fn cmd_validate(
    type_name: &str,
    xsd11: bool,
    values: &[String],
) -> Result<bool, Box<dyn std::error::Error>> {
    let universe = universe(xsd11);
    let decl = universe.require(type_name)?;
    let ctx = universe.context();

    let mut all_valid = true;
    for value in values {
        match decl.validate(value, &ctx) {
            Ok(actual) => println!("✓ {:?} -> {}", value, actual.canonical()),
            Err(e) => {
                all_valid = false;
                println!("✗ {:?}", value);
                for line in e.to_string().lines() {
                    println!("    {}", line);
                }
            }
        }
    }
    Ok(all_valid)
}

#[cfg(feature = "cli")]
fn cmd_compare(
    type_name: &str,
    xsd11: bool,
    a: &str,
    b: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let universe = universe(xsd11);
    let decl = universe.require(type_name)?;
    let ctx = universe.context();

    let left = decl.validate(a, &ctx)?;
    let right = decl.validate(b, &ctx)?;
    println!("{}", decl.compare(&left, &right));
    Ok(true)
}

#[cfg(feature = "cli")]
fn cmd_inspect(type_name: &str, xsd11: bool, json: bool) -> Result<bool, Box<dyn std::error::Error>> {
    let decl = universe(xsd11).require(type_name)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&decl.summary())?);
    } else {
        print_type_details(&decl);
    }
    Ok(true)
}

#[cfg(feature = "cli")]
fn print_type_details(decl: &SimpleTypeDecl) {
    println!("Type: {}", decl.display_name());
    println!("  Variety: {}", decl.variety());
    if let Some(kind) = decl.primitive_kind() {
        println!("  Primitive: {}", kind.primitive());
    }
    if let Some(base) = decl.base_type() {
        println!("  Base: {}", base.display_name());
    }
    if let Some(item) = decl.item_type() {
        println!("  Item Type: {}", item.display_name());
    }
    if !decl.member_types().is_empty() {
        let members: Vec<String> = decl.member_types().iter().map(|m| m.display_name()).collect();
        println!("  Member Types: {}", members.join(", "));
    }
    println!("  Ordered: {}", decl.ordered().as_str());
    println!("  Bounded: {}", decl.bounded());
    println!("  Numeric: {}", decl.numeric());

    let defined = decl.defined_facets();
    if defined.is_empty() {
        return;
    }
    println!();
    println!("Facets:");
    for facet in defined.iter() {
        let fixed = if decl.is_fixed_facet(facet) { " (fixed)" } else { "" };
        match facet {
            Facet::Pattern => {
                for step in decl.lexical_patterns() {
                    println!("  pattern: {}{}", step.join(" | "), fixed);
                }
            }
            Facet::Enumeration => {
                let values = decl.lexical_enumeration().unwrap_or_default();
                println!("  enumeration: [{}]{}", values.join(", "), fixed);
            }
            _ => {
                let value = decl.lexical_facet_value(facet).unwrap_or_default();
                println!("  {}: {}{}", facet, value, fixed);
            }
        }
    }
}

#[cfg(feature = "cli")]
fn cmd_types(xsd11: bool) -> Result<bool, Box<dyn std::error::Error>> {
    for name in universe(xsd11).names() {
        println!("{}", name);
    }
    Ok(true)
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
