use anyhow::Result;

use udmi_coord::enumeration;
use udmi_coord::helpers::read_json_arg;
use udmi_coord::schema::DiscoveryEvents;

use super::print_json;
use crate::argsets::ResolveArgs;

pub fn resolve(args: ResolveArgs) -> Result<()> {
    let tree: DiscoveryEvents = read_json_arg(&args.events)?;
    let resolved = enumeration::resolve(&tree, args.context, args.depth)?;
    print_json(&resolved)
}
