use std::io::Cursor;

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::inference::InferenceClient;
use crate::models::GenerationOptions;

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    pub intent: String,
    pub negative_prompt: Option<String>,
    pub num_inference_steps: Option<u32>,
    pub guidance_scale: Option<f32>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "healthy" }))
}

async fn generate(
    client: web::Data<InferenceClient>,
    body: web::Json<GenerateBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let options = GenerationOptions {
        negative_prompt: body.negative_prompt,
        num_inference_steps: body.num_inference_steps,
        guidance_scale: body.guidance_scale,
        ..Default::default()
    };

    match client.create_image(&body.intent, options).await {
        Ok(creation) => {
            log::info!("{}", creation.label());
            let mut png = Vec::new();
            match creation
                .image
                .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            {
                Ok(()) => HttpResponse::Ok().content_type("image/png").body(png),
                Err(e) => HttpResponse::InternalServerError()
                    .json(json!({ "error": format!("failed to encode image: {}", e) })),
            }
        }
        Err(e) => {
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/generate", web::post().to(generate));
}

/// Mount the client behind /health and /generate and serve until shutdown.
pub async fn serve(client: InferenceClient, port: u16) -> std::io::Result<()> {
    let data = web::Data::new(client);
    log::info!("Serving on http://0.0.0.0:{}", port);

    HttpServer::new(move || App::new().app_data(data.clone()).configure(configure))
        .bind(("0.0.0.0", port))?
        .run()
        .await
}
