pub struct UserUpsertRequest {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub google_id: Option<String>,
}
