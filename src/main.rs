fn main() -> anyhow::Result<()> {
    traj_annotator_lib::run()
}
