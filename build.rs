// The sync endpoint can be fixed at compile time through `option_env!`.
fn main() {
    println!("cargo:rerun-if-env-changed=RANGELOG_SYNC_URL");
}
