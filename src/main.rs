fn main() {
    quake_catalogue_viewer::run_native();
}
